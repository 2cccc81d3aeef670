//! Inference layer: chunked review classification over a pluggable backend.
//!
//! [`predict`] owns the batching policy and label checks; a
//! [`SequenceClassifier`] only maps texts to arg-max class indices. The
//! ONNX Runtime backend lives behind the `onnx` feature.

mod cache;
mod classifier;
mod error;
#[cfg(feature = "onnx")]
mod onnx;

pub use cache::ClassifierCache;
pub use classifier::{BATCH_SIZE, MAX_LENGTH, SequenceClassifier, predict};
pub use error::{ClassifyError, ModelLoadError};
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;
