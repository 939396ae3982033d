//! Error type shared by every TableLens operation.
//!
//! All engine calls return [`Result`]; the session layer turns any
//! [`LensError`] into a diagnostic response instead of aborting.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LensError {
    /// A referenced column does not exist in the table.
    #[error("Column '{0}' not found")]
    Schema(String),

    #[error("Duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("Column '{column}' has {found} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Type mismatch in column '{column}': expected {expected}, got {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// The operation needs at least one row.
    #[error("Cannot {0} an empty table")]
    EmptyTable(&'static str),

    #[error("Unknown chart kind '{0}'. Use: bar, line, scatter, histogram, or pie")]
    ChartKind(String),

    #[error("Unknown aggregation function '{0}'. Use: count, sum, mean, median, min, max, std, or var")]
    UnknownAggregate(String),

    #[error("Group '{0}' not found")]
    UnknownGroup(String),

    #[error("Row {row} out of range [0, {len})")]
    RowOutOfRange { row: usize, len: usize },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LensError>;
