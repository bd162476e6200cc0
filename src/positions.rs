//! Bar and label positions along the categorical axis.
//!
//! Bars are placed left to right in row order. Consecutive bars inside the
//! innermost group touch; whenever the index changes at level `i`, an extra
//! gap of `(depth - 1 - i) * space_width` is inserted, so changes at outer
//! levels separate groups further.

use crate::data::{Row, Table};
use crate::error::{BarplotError, BarplotResult};

/// A positioned bar: center on the categorical axis, height, optional std.
#[derive(Debug, Clone, PartialEq)]
pub struct BarPosition<'a> {
    pub x: f64,
    pub y: f64,
    pub std: Option<f64>,
    pub index: &'a [String],
}

/// Iterator over the bar centers of a table
pub struct BarPositions<'a> {
    rows: std::slice::Iter<'a, Row>,
    previous: Option<&'a Row>,
    bar_width: f64,
    space_width: f64,
    depth: usize,
    next_x: f64,
}

impl<'a> Iterator for BarPositions<'a> {
    type Item = BarPosition<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;

        if let Some(prev) = self.previous {
            let changed = prev
                .index
                .iter()
                .zip(&row.index)
                .position(|(a, b)| a != b);
            if let Some(level) = changed {
                self.next_x += (self.depth - 1 - level) as f64 * self.space_width;
            }
        }
        self.previous = Some(row);

        let x = self.next_x;
        self.next_x += self.bar_width;

        Some(BarPosition {
            x,
            y: row.values.first().copied().unwrap_or(0.0),
            std: row.values.get(1).copied(),
            index: &row.index,
        })
    }
}

/// Yield one positioned bar per row
pub fn bar_positions(table: &Table, bar_width: f64, space_width: f64) -> BarPositions<'_> {
    BarPositions {
        rows: table.rows().iter(),
        previous: None,
        bar_width,
        space_width,
        depth: table.depth(),
        next_x: bar_width / 2.0,
    }
}

/// Total span of the categorical axis: right edge of the last bar
pub fn max_bar_position(table: &Table, bar_width: f64, space_width: f64) -> f64 {
    bar_positions(table, bar_width, space_width)
        .last()
        .map(|bar| bar.x + bar_width / 2.0)
        .unwrap_or(0.0)
}

/// Label anchors for one index level.
///
/// One entry per distinct combination of levels `0..=level`, in row order of
/// first occurrence, placed at the midpoint of the outermost bars carrying it.
pub fn text_positions(
    table: &Table,
    bar_width: f64,
    space_width: f64,
    level: usize,
) -> BarplotResult<Vec<(f64, String)>> {
    let depth = table.depth();
    if level >= depth {
        return Err(BarplotError::ShapeMismatch { level, depth });
    }

    // (key, min center, max center)
    let mut groups: Vec<(&[String], f64, f64)> = Vec::new();
    for bar in bar_positions(table, bar_width, space_width) {
        let key = &bar.index[..=level];
        match groups.iter_mut().find(|(k, _, _)| *k == key) {
            Some((_, min, max)) => {
                *min = min.min(bar.x);
                *max = max.max(bar.x);
            }
            None => groups.push((key, bar.x, bar.x)),
        }
    }

    Ok(groups
        .into_iter()
        .map(|(key, min, max)| ((min + max) / 2.0, key[level].clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn sample() -> Table {
        Table::from_records(vec![
            (vec!["A", "x"], 1.0),
            (vec!["A", "y"], 2.0),
            (vec!["B", "x"], 3.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_bar_positions_group_gap() {
        let table = sample();
        let xs: Vec<f64> = bar_positions(&table, 0.8, 0.2).map(|b| b.x).collect();
        assert_eq!(xs.len(), 3);
        assert!((xs[0] - 0.4).abs() < EPS);
        assert!((xs[1] - 1.2).abs() < EPS);
        assert!((xs[2] - 2.2).abs() < EPS);
    }

    #[test]
    fn test_max_bar_position() {
        let table = sample();
        assert!((max_bar_position(&table, 0.8, 0.2) - 2.6).abs() < EPS);
        let empty = Table::from_records(Vec::<(Vec<&str>, f64)>::new()).unwrap();
        assert_eq!(max_bar_position(&empty, 0.8, 0.2), 0.0);
    }

    #[test]
    fn test_text_positions_levels() {
        let table = sample();
        let minor = text_positions(&table, 0.8, 0.2, 1).unwrap();
        let labels: Vec<&str> = minor.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(labels, vec!["x", "y", "x"]);

        let major = text_positions(&table, 0.8, 0.2, 0).unwrap();
        assert_eq!(major.len(), 2);
        assert_eq!(major[0].1, "A");
        assert!((major[0].0 - 0.8).abs() < EPS);
        assert_eq!(major[1].1, "B");
        assert!((major[1].0 - 2.2).abs() < EPS);
    }

    #[test]
    fn test_text_positions_single_row() {
        let table = Table::from_records(vec![(vec!["only"], 5.0)]).unwrap();
        let pos = text_positions(&table, 0.5, 0.3, 0).unwrap();
        assert_eq!(pos, vec![(0.25, "only".to_string())]);
    }

    #[test]
    fn test_text_positions_shape_mismatch() {
        let table = sample();
        let err = text_positions(&table, 0.8, 0.2, 2).unwrap_err();
        assert_eq!(err, BarplotError::ShapeMismatch { level: 2, depth: 2 });
    }

    #[test]
    fn test_text_positions_non_contiguous_group_merges() {
        let table = Table::from_records(vec![
            (vec!["A", "x"], 1.0),
            (vec!["B", "x"], 1.0),
            (vec!["A", "y"], 1.0),
        ])
        .unwrap();
        let major = text_positions(&table, 1.0, 0.0, 0).unwrap();
        assert_eq!(major.len(), 2);
        assert_eq!(major[0].1, "A");
        // spans the first and the third bar
        assert!((major[0].0 - 1.5).abs() < EPS);
    }

    #[test]
    fn test_std_column_is_carried() {
        let table = Table::new(
            vec!["g".to_string()],
            vec!["v".to_string(), "s".to_string()],
            vec![Row { index: vec!["A".to_string()], values: vec![2.0, 0.5] }],
        )
        .unwrap();
        let bar = bar_positions(&table, 1.0, 0.0).next().unwrap();
        assert_eq!(bar.std, Some(0.5));
        assert_eq!(bar.y, 2.0);
    }
}
