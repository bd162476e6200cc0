//! Error types for the label layout and style resolution core

use thiserror::Error;

/// Errors raised by the layout core. None of them are transient.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BarplotError {
    /// Requested index level does not exist in the table
    #[error("level {level} requested but the table index has only {depth} level(s)")]
    ShapeMismatch { level: usize, depth: usize },

    /// No style entry applies to a category path
    #[error("no style matches category path {}", .path.join(" / "))]
    NoStyleMatch { path: Vec<String> },

    /// A level produced no labels
    #[error("level {level} has no labels to place")]
    EmptyLevel { level: usize },

    /// A row carries a different number of index levels than the first row
    #[error("row {row} has {found} index level(s), expected {expected}")]
    InconsistentIndex {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Style key could not be parsed into a category path
    #[error("invalid style key: {0}")]
    InvalidStyleKey(String),

    /// Cell could not be read as a number
    #[error("failed to parse '{value}' as number in column '{column}' at row {row}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    /// Column named by the caller is absent
    #[error("column '{0}' not found")]
    MissingColumn(String),

    /// Color string is neither a known name nor a hex code
    #[error("unknown color: {0}")]
    UnknownColor(String),
}

/// Result type for layout operations
pub type BarplotResult<T> = Result<T, BarplotError>;
