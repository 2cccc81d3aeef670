use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("review file not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("schema error: {path} has no '{column}' column")]
    Schema {
        path: std::path::PathBuf,
        column: &'static str,
    },

    #[error("{predictions} predictions for {rows} review rows")]
    LengthMismatch { rows: usize, predictions: usize },

    #[error("invalid {column} value {value:?} at row {row}")]
    InvalidValue {
        column: &'static str,
        row: usize,
        value: String,
    },

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
