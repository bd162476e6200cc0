use crate::data::Table;
use crate::positions::max_bar_position;
use crate::ticks::Orientation;

/// Domain of the value axis: bar tops and error whiskers, always including 0
pub fn value_domain(table: &Table) -> (f64, f64) {
    let mut min: f64 = 0.0;
    let mut max: f64 = 0.0;

    for row in table.rows() {
        let y = row.values.first().copied().unwrap_or(0.0);
        let std = row.values.get(1).copied().unwrap_or(0.0).abs();
        min = min.min(y - std);
        max = max.max(y + std);
    }

    pad_range(min, max)
}

/// Domain of the categorical axis: the whole bar span
pub fn category_domain(table: &Table, bar_width: f64, space_width: f64) -> (f64, f64) {
    let width = max_bar_position(table, bar_width, space_width);
    if width <= 0.0 {
        (0.0, 1.0)
    } else {
        (0.0, width)
    }
}

/// (x_range, y_range) of a panel for the given orientation
pub fn panel_ranges(
    table: &Table,
    bar_width: f64,
    space_width: f64,
    orientation: Orientation,
) -> ((f64, f64), (f64, f64)) {
    let categories = category_domain(table, bar_width, space_width);
    let values = value_domain(table);
    match orientation {
        Orientation::Vertical => (categories, values),
        Orientation::Horizontal => (values, categories),
    }
}

fn pad_range(min: f64, max: f64) -> (f64, f64) {
    if min == max {
        (min - 1.0, max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        // keep the zero baseline flush with the axis
        let low = if min == 0.0 { 0.0 } else { min - padding };
        let high = if max == 0.0 { 0.0 } else { max + padding };
        (low, high)
    }
}
