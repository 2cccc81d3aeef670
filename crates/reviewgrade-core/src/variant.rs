//! Pretrained model variants the pipeline can grade with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named pretrained sequence-classification checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelVariant {
    Bert,
    XlNet,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown model variant {0:?} (expected \"bert\" or \"xlnet\")")]
pub struct UnknownVariant(pub String);

impl ModelVariant {
    pub const ALL: [ModelVariant; 2] = [ModelVariant::Bert, ModelVariant::XlNet];

    /// Upstream model name the checkpoint was fine-tuned from.
    pub fn model_name(&self) -> &'static str {
        match self {
            Self::Bert => "bert-base-uncased",
            Self::XlNet => "xlnet-base-cased",
        }
    }

    /// Directory name of the checkpoint under the models directory.
    pub fn checkpoint_dir(&self) -> &'static str {
        match self {
            Self::Bert => "Bert",
            Self::XlNet => "XLnet",
        }
    }

    /// Short lowercase name used for routes and CLI values.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Bert => "bert",
            Self::XlNet => "xlnet",
        }
    }

    /// File name of the per-run processed table. Derived from the model name
    /// so that back-to-back runs of different variants do not collide.
    pub fn processed_file_name(&self) -> String {
        format!("{}_processed_reviews.csv", self.model_name())
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ModelVariant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|v| v.slug() == lower || v.model_name() == lower)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}
