//! Subplot layout and cross-subplot label de-duplication.

use std::collections::HashSet;

use serde::Deserialize;

use crate::axes::TickSet;
use crate::ticks::Orientation;

/// How subplots are arranged on the figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubplotLayout {
    /// Near-square grid
    #[default]
    Grid,
    /// All subplots side by side
    Row,
    /// All subplots stacked
    Column,
}

/// (nrow, ncol) for `n_panels` subplots
pub fn calculate_grid_dimensions(n_panels: usize, layout: SubplotLayout) -> (usize, usize) {
    let n = n_panels.max(1);
    match layout {
        SubplotLayout::Row => (1, n),
        SubplotLayout::Column => (n, 1),
        SubplotLayout::Grid => {
            let cols = (n as f64).sqrt().ceil() as usize;
            let rows = (n as f64 / cols as f64).ceil() as usize;
            (rows, cols)
        }
    }
}

/// Grid cell of the `index`-th panel, row-major
pub fn grid_cell(index: usize, ncol: usize) -> (usize, usize) {
    (index / ncol, index % ncol)
}

/// Panel indices in the order labels should be claimed.
///
/// Vertical charts share category labels down a column, so the bottom row
/// goes first; horizontal charts share them along a row, so the left column
/// goes first.
pub fn label_order(n_panels: usize, ncol: usize, orientation: Orientation) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n_panels).collect();
    match orientation {
        Orientation::Vertical => order.sort_by_key(|&i| {
            let (row, col) = grid_cell(i, ncol);
            (std::cmp::Reverse(row), col)
        }),
        Orientation::Horizontal => order.sort_by_key(|&i| {
            let (row, col) = grid_cell(i, ncol);
            (col, std::cmp::Reverse(row))
        }),
    }
    order
}

/// Axis group whose subplots share category labels
pub fn category_group(row: usize, col: usize, orientation: Orientation) -> usize {
    match orientation {
        Orientation::Vertical => col,
        Orientation::Horizontal => row,
    }
}

/// Axis group whose subplots share the value-axis label
pub fn value_group(row: usize, col: usize, orientation: Orientation) -> usize {
    match orientation {
        Orientation::Vertical => row,
        Orientation::Horizontal => col,
    }
}

/// Labels already emitted across the subplots of one figure.
///
/// Owned by the caller and passed through successive label passes; the label
/// engine itself keeps no state between calls.
#[derive(Debug, Clone, Default)]
pub struct SharedAxisLabels {
    ticks: HashSet<(usize, TickSet, Vec<String>)>,
    data_labels: HashSet<usize>,
}

impl SharedAxisLabels {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if this exact label sequence was already emitted for the group
    pub fn is_emitted(&self, group: usize, which: TickSet, labels: &[String]) -> bool {
        self.ticks.contains(&(group, which, labels.to_vec()))
    }

    pub fn record(&mut self, group: usize, which: TickSet, labels: &[String]) {
        self.ticks.insert((group, which, labels.to_vec()));
    }

    pub fn data_label_emitted(&self, group: usize) -> bool {
        self.data_labels.contains(&group)
    }

    pub fn record_data_label(&mut self, group: usize) {
        self.data_labels.insert(group);
    }
}
