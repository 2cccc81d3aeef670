//! ONNX Runtime backend for fine-tuned sequence-classification checkpoints.
//!
//! A checkpoint directory must contain `model.onnx` (the pretrained model
//! exported with a `logits` output of shape `[batch, num_labels]`) and
//! `tokenizer.json`.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex};

use ort::session::{Session, SessionInputValue};
use ort::value::Tensor;
use reviewgrade_core::ModelVariant;
use tokenizers::{Encoding, Tokenizer};
use tracing::info;

use crate::{ClassifierCache, ClassifyError, MAX_LENGTH, ModelLoadError, SequenceClassifier};

static CACHE: LazyLock<ClassifierCache<OnnxClassifier>> = LazyLock::new(ClassifierCache::new);

/// Sequence classifier running a transformer checkpoint under ONNX Runtime.
#[derive(Debug)]
pub struct OnnxClassifier {
    session: Session,
    tokenizer: Tokenizer,
    /// Whether the exported graph takes `token_type_ids` (BERT does).
    wants_token_types: bool,
    num_labels: Option<usize>,
}

impl OnnxClassifier {
    /// Load a classifier from a directory containing `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path) -> Result<Self, ModelLoadError> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() {
            return Err(ModelLoadError::new(model_dir, "model.onnx not found"));
        }
        if !tokenizer_path.exists() {
            return Err(ModelLoadError::new(model_dir, "tokenizer.json not found"));
        }

        let session = open_session(&model_path).map_err(|e| ModelLoadError::new(model_dir, e))?;

        let wants_token_types = session
            .inputs()
            .iter()
            .any(|input| input.name() == "token_type_ids");
        let num_labels = infer_num_labels(first_output(session.outputs(), model_dir)?.dtype());

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| ModelLoadError::new(model_dir, format!("load tokenizer: {e}")))?;

        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| ModelLoadError::new(model_dir, format!("set truncation: {e}")))?;

        // Pad to the longest text in each batch. Keep the tokenizer's own
        // padding config (side, pad token) if it ships one.
        if tokenizer.get_padding().is_none() {
            tokenizer.with_padding(Some(tokenizers::PaddingParams::default()));
        }

        info!(
            model = %model_path.display(),
            ?num_labels,
            wants_token_types,
            "loaded classifier"
        );
        Ok(Self {
            session,
            tokenizer,
            wants_token_types,
            num_labels,
        })
    }

    /// Load `<models_dir>/<checkpoint>` for a variant once per process and
    /// share it afterwards.
    pub fn cached(
        variant: ModelVariant,
        models_dir: &Path,
    ) -> Result<Arc<Mutex<Self>>, ModelLoadError> {
        let dir: PathBuf = models_dir.join(variant.checkpoint_dir());
        CACHE.get_or_load(variant, || Self::load(&dir))
    }

    /// Number of output classes, when the graph declares it statically.
    pub fn num_labels(&self) -> Option<usize> {
        self.num_labels
    }
}

impl SequenceClassifier for OnnxClassifier {
    fn classify_batch(&mut self, texts: &[&str]) -> Result<Vec<usize>, ClassifyError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let batch_size = texts.len();

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| ClassifyError::Tokenize(e.to_string()))?;

        // Rows shorter than the longest one only occur when the tokenizer
        // ships without a padding config; they are zero-filled on the right.
        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);
        let input_ids = padded_rows(&encodings, seq_len, Encoding::get_ids);
        let attention_mask = padded_rows(&encodings, seq_len, Encoding::get_attention_mask);
        let token_type_ids = padded_rows(&encodings, seq_len, Encoding::get_type_ids);

        let shape = [batch_size as i64, seq_len as i64];
        let inference = |e: ort::Error| ClassifyError::Inference(e.to_string());

        let ids_tensor =
            Tensor::from_array((shape, input_ids.into_boxed_slice())).map_err(inference)?;
        let mask_tensor =
            Tensor::from_array((shape, attention_mask.into_boxed_slice())).map_err(inference)?;

        let mut inputs: Vec<(Cow<'_, str>, SessionInputValue<'_>)> = vec![
            (Cow::from("input_ids"), SessionInputValue::from(ids_tensor)),
            (Cow::from("attention_mask"), SessionInputValue::from(mask_tensor)),
        ];
        if self.wants_token_types {
            let type_tensor =
                Tensor::from_array((shape, token_type_ids.into_boxed_slice())).map_err(inference)?;
            inputs.push((Cow::from("token_type_ids"), SessionInputValue::from(type_tensor)));
        }

        let outputs = self.session.run(inputs).map_err(inference)?;

        // One row of class scores per review.
        let (output_shape, logits) = outputs[0].try_extract_tensor::<f32>().map_err(inference)?;
        let dims: &[i64] = output_shape;
        if dims.len() != 2 || dims[0] as usize != batch_size || dims[1] <= 0 {
            return Err(ClassifyError::Inference(format!(
                "unexpected logits shape {dims:?}, expected [{batch_size}, num_labels]"
            )));
        }
        let num_labels = dims[1] as usize;

        Ok(logits.chunks(num_labels).map(argmax).collect())
    }
}

/// Flatten one encoding field per row into a `[rows, seq_len]` buffer.
fn padded_rows(
    encodings: &[Encoding],
    seq_len: usize,
    field: fn(&Encoding) -> &[u32],
) -> Vec<i64> {
    let mut flat = vec![0i64; encodings.len() * seq_len];
    for (row, encoding) in flat.chunks_mut(seq_len.max(1)).zip(encodings) {
        for (slot, &v) in row.iter_mut().zip(field(encoding)) {
            *slot = i64::from(v);
        }
    }
    flat
}

/// The classification head is read from the graph's first output.
fn first_output<'a, T>(outputs: &'a [T], model_dir: &Path) -> Result<&'a T, ModelLoadError> {
    outputs
        .first()
        .ok_or_else(|| ModelLoadError::new(model_dir, "model has no outputs"))
}

fn open_session(model_path: &Path) -> ort::Result<Session> {
    Ok(Session::builder()?.commit_from_file(model_path)?)
}

/// Index of the largest logit; the first one wins on ties.
fn argmax(row: &[f32]) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best_i, best), (i, &v)| {
            if v > best { (i, v) } else { (best_i, best) }
        })
        .0
}

/// Try to read the class count from the ONNX model output type.
fn infer_num_labels(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict;
    use reviewgrade_core::{Label, ReviewBatch};

    fn model_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("model_checkpoints")
            .join("Bert")
    }

    #[test]
    fn argmax_picks_largest_logit() {
        assert_eq!(argmax(&[0.1, 2.5]), 1);
        assert_eq!(argmax(&[3.0, -1.0]), 0);
        assert_eq!(argmax(&[1.0, 1.0]), 0);
    }

    fn encoding(ids: &[u32]) -> Encoding {
        let tokens = ids
            .iter()
            .map(|&id| tokenizers::Token::new(id, format!("t{id}"), (0, 0)))
            .collect();
        Encoding::from_tokens(tokens, 0)
    }

    #[test]
    fn short_rows_are_zero_filled() {
        let encodings = [encoding(&[101, 7, 102]), encoding(&[101])];
        assert_eq!(
            padded_rows(&encodings, 3, Encoding::get_ids),
            vec![101, 7, 102, 101, 0, 0]
        );
        assert_eq!(
            padded_rows(&encodings, 3, Encoding::get_attention_mask),
            vec![1, 1, 1, 1, 0, 0]
        );
    }

    #[test]
    fn graph_without_outputs_is_model_load_error() {
        let dir = Path::new("model_checkpoints/Bert");
        let err = first_output::<u8>(&[], dir).unwrap_err();
        assert!(err.to_string().contains("model has no outputs"), "got {err}");
        assert_eq!(first_output(&[3u8, 4], dir).unwrap(), &3);
    }

    #[test]
    fn load_missing_dir_is_model_load_error() {
        let err = OnnxClassifier::load(Path::new("/nonexistent/checkpoint")).unwrap_err();
        assert!(err.to_string().contains("model.onnx not found"), "got {err}");
    }

    #[test]
    #[ignore = "needs an exported checkpoint under model_checkpoints/Bert"]
    fn classify_with_exported_bert() {
        let mut clf = OnnxClassifier::load(&model_dir()).unwrap();
        assert_eq!(clf.num_labels(), Some(2));

        let reviews: ReviewBatch = [
            "Arrived quickly and works exactly as described.",
            "BEST PRODUCT EVER!!! Buy now, five stars, amazing amazing amazing!",
        ]
        .into_iter()
        .collect();
        let predictions = predict(&mut clf, &reviews).unwrap();
        assert_eq!(predictions.len(), 2);
        assert!(predictions.iter().all(|p| matches!(p, Some(Label::Real | Label::Fake))));
    }
}
