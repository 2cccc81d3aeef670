use std::path::PathBuf;

use reviewgrade_core::LabelError;
use thiserror::Error;

/// A model or tokenizer could not be resolved from its checkpoint directory.
#[derive(Debug, Error)]
#[error("error loading model from {}: {source}", .path.display())]
pub struct ModelLoadError {
    pub path: PathBuf,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl ModelLoadError {
    pub fn new(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The model emitted a class outside {0 = real, 1 = fake}; the checkpoint
    /// is not a two-class review model.
    #[error("model configuration error: {0}")]
    Label(#[from] LabelError),

    #[error("classifier returned {got} labels for {expected} texts")]
    CountMismatch { expected: usize, got: usize },

    #[error("tokenization failed: {0}")]
    Tokenize(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("classifier lock poisoned")]
    Poisoned,
}
