//! Storage layer: flat CSV review tables exchanged between pipeline stages.
//!
//! Writes are plain file overwrites with no atomic rename, and two runs that
//! share a path will race. Callers that run concurrently must serialise
//! access themselves.

mod error;
mod table;

pub use error::StoreError;
pub use table::{load_predictions, load_reviews, save_processed, save_reviews};
