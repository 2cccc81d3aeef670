//! Review text and the ordered batches the pipeline carries between stages.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single scraped review.
///
/// Holds the raw text as found. Reviews produced by the scraper are never
/// blank; reviews read back from a file may be (a null CSV cell loads as an
/// empty review so that row counts are preserved).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Review(String);

impl Review {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Raw text, exactly as stored.
    pub fn text(&self) -> &str {
        &self.0
    }

    /// Text with surrounding whitespace removed; this is what the classifier sees.
    pub fn trimmed(&self) -> &str {
        self.0.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }

    pub fn into_text(self) -> String {
        self.0
    }
}

impl From<&str> for Review {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Review {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Ordered reviews from one page, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewBatch {
    reviews: Vec<Review>,
}

impl ReviewBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, review: impl Into<Review>) {
        self.reviews.push(review.into());
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Review> {
        self.reviews.iter()
    }

    pub fn as_slice(&self) -> &[Review] {
        &self.reviews
    }

    /// Raw texts in order.
    pub fn texts(&self) -> Vec<&str> {
        self.reviews.iter().map(Review::text).collect()
    }
}

impl<R: Into<Review>> FromIterator<R> for ReviewBatch {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self {
            reviews: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl IntoIterator for ReviewBatch {
    type Item = Review;
    type IntoIter = std::vec::IntoIter<Review>;

    fn into_iter(self) -> Self::IntoIter {
        self.reviews.into_iter()
    }
}

impl<'a> IntoIterator for &'a ReviewBatch {
    type Item = &'a Review;
    type IntoIter = std::slice::Iter<'a, Review>;

    fn into_iter(self) -> Self::IntoIter {
        self.reviews.iter()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("class index {0} is outside the two-class label space {{0 = real, 1 = fake}}")]
    OutOfRange(i64),
    #[error("class index {0} is outside the two-class label space {{0 = real, 1 = fake}}")]
    IndexOutOfRange(usize),
}

/// Classifier output for one review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Label {
    Real = 0,
    Fake = 1,
}

impl Label {
    /// Integer class index as written to the processed table.
    pub fn index(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for Label {
    type Error = LabelError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Real),
            1 => Ok(Self::Fake),
            other => Err(LabelError::OutOfRange(other)),
        }
    }
}

impl TryFrom<usize> for Label {
    type Error = LabelError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Real),
            1 => Ok(Self::Fake),
            other => Err(LabelError::IndexOutOfRange(other)),
        }
    }
}

/// Prediction for one row of a batch. `None` marks a row that was blank
/// after trimming and was never sent to the model.
pub type Prediction = Option<Label>;
