//! Chunked batch prediction over any [`SequenceClassifier`].

use reviewgrade_core::{Label, Prediction, Review, ReviewBatch};
use tracing::{debug, info};

use crate::ClassifyError;

/// Reviews sent to the model per forward pass.
pub const BATCH_SIZE: usize = 16;
/// Token limit per review; longer reviews are truncated.
pub const MAX_LENGTH: usize = 512;

/// A two-class sequence classifier.
///
/// Implementations receive non-blank, trimmed texts and return the arg-max
/// class index for each, in input order.
pub trait SequenceClassifier {
    fn classify_batch(&mut self, texts: &[&str]) -> Result<Vec<usize>, ClassifyError>;
}

impl<C: SequenceClassifier + ?Sized> SequenceClassifier for &mut C {
    fn classify_batch(&mut self, texts: &[&str]) -> Result<Vec<usize>, ClassifyError> {
        (**self).classify_batch(texts)
    }
}

impl<C: SequenceClassifier + ?Sized> SequenceClassifier for Box<C> {
    fn classify_batch(&mut self, texts: &[&str]) -> Result<Vec<usize>, ClassifyError> {
        (**self).classify_batch(texts)
    }
}

/// Classify every review of a batch.
///
/// Reviews are processed in chunks of [`BATCH_SIZE`]. Within a chunk, reviews
/// that are blank after trimming are not sent to the model and get a `None`
/// prediction, so the output always has exactly one entry per input review,
/// in input order. A chunk with no non-blank review skips inference.
pub fn predict<C>(
    classifier: &mut C,
    reviews: &ReviewBatch,
) -> Result<Vec<Prediction>, ClassifyError>
where
    C: SequenceClassifier + ?Sized,
{
    let mut predictions: Vec<Prediction> = Vec::with_capacity(reviews.len());
    let mut calls = 0usize;

    for chunk in reviews.as_slice().chunks(BATCH_SIZE) {
        let texts: Vec<&str> = chunk
            .iter()
            .map(Review::trimmed)
            .filter(|t| !t.is_empty())
            .collect();

        if texts.is_empty() {
            predictions.extend(std::iter::repeat_n(None, chunk.len()));
            continue;
        }

        let classes = classifier.classify_batch(&texts)?;
        calls += 1;
        if classes.len() != texts.len() {
            return Err(ClassifyError::CountMismatch {
                expected: texts.len(),
                got: classes.len(),
            });
        }

        let mut classes = classes.into_iter();
        for review in chunk {
            if review.is_blank() {
                predictions.push(None);
            } else {
                // Length checked above.
                let class = classes.next().ok_or(ClassifyError::CountMismatch {
                    expected: texts.len(),
                    got: 0,
                })?;
                predictions.push(Some(Label::try_from(class)?));
            }
        }
        debug!(chunk = calls, size = texts.len(), "classified chunk");
    }

    let skipped = predictions.iter().filter(|p| p.is_none()).count();
    info!(reviews = reviews.len(), calls, skipped, "classified reviews");
    Ok(predictions)
}
