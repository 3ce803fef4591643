/// Error type shared by every dataset operation.
///
/// Every failure is a contract violation reported synchronously to the caller;
/// nothing is retried, and mutating operations leave the dataset untouched when
/// they return one of these.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Row is missing a value for existing column '{column}'")]
    SchemaMismatch { column: String },

    #[error("Type mismatch in column '{column}': expected {expected}, got {found}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Column '{0}' not found")]
    UnknownColumn(String),

    #[error("Merge conflict: {0}")]
    MergeConflict(String),

    #[error("Index {index} out of range [0, {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No sort index: call sort() before requesting sorted rows")]
    NoSortIndex,

    #[error("Row {offset}: {source}")]
    RowOffset {
        offset: usize,
        #[source]
        source: Box<DatasetError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid JSON row: {0}")]
    InvalidJson(String),
}

pub type Result<T> = std::result::Result<T, DatasetError>;
