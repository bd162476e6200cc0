use std::collections::HashSet;

use proptest::prelude::*;

use barplots::positions::text_positions;
use barplots::sanitize::CustomDefaults;
use barplots::ticks::auto_rotation;
use barplots::{plot_bar_labels, resolve, AxesState, LabelOptions, Orientation, Rotation, StyleMap, Table};

fn table_from(pairs: &[(u8, u8)]) -> Table {
    Table::from_records(
        pairs
            .iter()
            .enumerate()
            .map(|(i, (g, c))| (vec![format!("g{}", g), format!("c{}", c)], i as f64)),
    )
    .unwrap()
}

fn options(custom: &CustomDefaults) -> LabelOptions<'_> {
    LabelOptions {
        orientation: Orientation::Vertical,
        bar_width: 0.8,
        space_width: 0.2,
        minor_rotation: Rotation::Auto,
        major_rotation: Rotation::Auto,
        unique_minor_labels: false,
        unique_major_labels: false,
        unique_data_label: false,
        custom_defaults: custom,
    }
}

fn rounded(p: f64) -> f64 {
    (p * 1e5).round() / 1e5
}

fn rows() -> impl Strategy<Value = Vec<(u8, u8)>> {
    prop::collection::vec((0u8..3, 0u8..4), 1..12)
}

proptest! {
    #[test]
    fn text_positions_count_distinct_prefixes(pairs in rows()) {
        let table = table_from(&pairs);
        for level in 0..2 {
            let placed = text_positions(&table, 0.8, 0.2, level).unwrap();
            let mut seen = Vec::new();
            for row in table.rows() {
                let prefix = row.index[..=level].to_vec();
                if !seen.contains(&prefix) {
                    seen.push(prefix);
                }
            }
            prop_assert_eq!(placed.len(), seen.len());
            let labels: Vec<_> = placed.iter().map(|(_, l)| l.clone()).collect();
            let expected: Vec<_> = seen.iter().map(|p| p[level].clone()).collect();
            prop_assert_eq!(labels, expected);
        }
    }

    #[test]
    fn text_positions_idempotent(pairs in rows()) {
        let table = table_from(&pairs);
        let first = text_positions(&table, 0.8, 0.2, 1).unwrap();
        let second = text_positions(&table, 0.8, 0.2, 1).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn colliding_major_ticks_move_by_one_unit(pairs in rows()) {
        let table = table_from(&pairs);
        let custom = CustomDefaults::new();
        let mut axes = AxesState::new();
        let layout = plot_bar_labels(&mut axes, &table, &options(&custom)).unwrap();
        let unit = layout.total_width * 0.0002;

        let minor = layout.minor().unwrap();
        let minor_bits: HashSet<u64> = minor.positions.iter().map(|p| p.to_bits()).collect();
        let raw_major = text_positions(&table, 0.8, 0.2, 0).unwrap();
        let major = layout.major().unwrap();

        for ((raw, _), placed) in raw_major.iter().zip(&major.positions) {
            let base = rounded(*raw);
            if minor_bits.contains(&base.to_bits()) {
                prop_assert_eq!(*placed, base + unit);
            } else {
                prop_assert_eq!(*placed, base);
            }
        }
    }

    #[test]
    fn full_tuple_key_always_wins(
        keys in prop::collection::vec(prop::collection::vec("[abc]", 1..4), 0..8),
        target in prop::collection::vec("[abc]", 1..4),
        at in 0usize..8,
    ) {
        let mut map = StyleMap::new();
        let at = at.min(keys.len());
        for (i, key) in keys.iter().enumerate() {
            if i == at {
                map.insert(target.clone(), -1i32);
            }
            map.insert(key.clone(), i as i32);
        }
        if at == keys.len() {
            map.insert(target.clone(), -1i32);
        }
        // a later identical key replaces the value in place
        let expected = keys
            .iter()
            .enumerate()
            .skip(at)
            .filter(|(_, k)| **k == target)
            .map(|(i, _)| i as i32)
            .last()
            .unwrap_or(-1);
        prop_assert_eq!(*resolve(&map, &target).unwrap(), expected);
    }
}

#[test]
fn rotation_boundaries() {
    // density 20 / 2 = 10 <= 10 * 5
    assert_eq!(auto_rotation(true, Orientation::Vertical, 20, 2, 10.0), 90.0);
    assert_eq!(auto_rotation(true, Orientation::Vertical, 2, 1, 10.0), 90.0);
    assert_eq!(auto_rotation(true, Orientation::Vertical, 51, 1, 10.0), 0.0);
}

#[test]
fn two_level_end_to_end() {
    let table = Table::from_records(vec![
        (vec!["A", "x"], 1.0),
        (vec!["A", "y"], 2.0),
        (vec!["B", "x"], 3.0),
    ])
    .unwrap();
    let custom = CustomDefaults::new();
    let mut axes = AxesState::new();
    let layout = plot_bar_labels(&mut axes, &table, &options(&custom)).unwrap();

    assert_eq!(axes.x.minor.positions.len(), 3);
    assert_eq!(axes.x.major.positions.len(), 2);
    let minor: HashSet<_> = axes.x.minor.labels.iter().cloned().collect();
    let major: HashSet<_> = axes.x.major.labels.iter().cloned().collect();
    assert_eq!(minor, ["x", "y"].map(String::from).into_iter().collect());
    assert_eq!(major, ["A", "B"].map(String::from).into_iter().collect());
    assert!((layout.total_width - 2.6).abs() < 1e-9);
}
