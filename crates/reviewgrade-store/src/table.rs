//! CSV persistence for the `review` and `review,prediction` tables.

use std::fs::File;
use std::io::Seek;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, Int64Array, StringArray};
use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use reviewgrade_core::tables::{self, PREDICTION_COLUMN, REVIEW_COLUMN};
use reviewgrade_core::{Label, Prediction, ReviewBatch};
use tracing::info;

use crate::StoreError;

/// Write reviews to `path` as a single-column CSV, replacing any existing file.
pub fn save_reviews(reviews: &ReviewBatch, path: &Path) -> Result<(), StoreError> {
    let column = StringArray::from(reviews.texts());
    let batch = RecordBatch::try_new(Arc::new(tables::review_schema()), vec![Arc::new(column)])?;
    write_csv(&batch, path)?;
    info!(count = reviews.len(), path = %path.display(), "saved reviews");
    Ok(())
}

/// Read reviews back from a CSV with a `review` header.
///
/// Extra columns are ignored. Every column is read as text, so reviews that
/// look numeric are kept verbatim. A null cell loads as an empty review.
pub fn load_reviews(path: &Path) -> Result<ReviewBatch, StoreError> {
    let batches = read_text_columns(path, &[REVIEW_COLUMN])?;
    let mut reviews = ReviewBatch::new();
    for batch in &batches {
        let col = text_column(batch, REVIEW_COLUMN)?;
        for row in 0..col.len() {
            reviews.push(if col.is_null(row) { "" } else { col.value(row) });
        }
    }
    info!(count = reviews.len(), path = %path.display(), "loaded reviews");
    Ok(reviews)
}

/// Write the processed table: every review row with its prediction.
///
/// Rows whose prediction is `None` (blank after trimming) get an empty
/// `prediction` cell, so the table always has one row per review.
pub fn save_processed(
    reviews: &ReviewBatch,
    predictions: &[Prediction],
    path: &Path,
) -> Result<(), StoreError> {
    if reviews.len() != predictions.len() {
        return Err(StoreError::LengthMismatch {
            rows: reviews.len(),
            predictions: predictions.len(),
        });
    }
    let review_col = StringArray::from(reviews.texts());
    let prediction_col: Int64Array = predictions.iter().map(|p| p.map(Label::index)).collect();
    let batch = RecordBatch::try_new(
        Arc::new(tables::processed_schema()),
        vec![Arc::new(review_col), Arc::new(prediction_col)],
    )?;
    write_csv(&batch, path)?;
    info!(count = reviews.len(), path = %path.display(), "saved processed reviews");
    Ok(())
}

/// Read a processed table back into reviews and their predictions.
pub fn load_predictions(path: &Path) -> Result<(ReviewBatch, Vec<Prediction>), StoreError> {
    let batches = read_text_columns(path, &[REVIEW_COLUMN, PREDICTION_COLUMN])?;
    let mut reviews = ReviewBatch::new();
    let mut predictions = Vec::new();
    for batch in &batches {
        let review_col = text_column(batch, REVIEW_COLUMN)?;
        let pred_col = text_column(batch, PREDICTION_COLUMN)?;
        for row in 0..batch.num_rows() {
            reviews.push(if review_col.is_null(row) { "" } else { review_col.value(row) });
            let prediction = if pred_col.is_null(row) {
                None
            } else {
                let raw = pred_col.value(row);
                let label = raw
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .and_then(|v| Label::try_from(v).ok())
                    .ok_or_else(|| StoreError::InvalidValue {
                        column: PREDICTION_COLUMN,
                        row: predictions.len(),
                        value: raw.to_string(),
                    })?;
                Some(label)
            };
            predictions.push(prediction);
        }
    }
    Ok((reviews, predictions))
}

fn write_csv(batch: &RecordBatch, path: &Path) -> Result<(), StoreError> {
    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer.write(batch)?;
    Ok(())
}

/// Read a headed CSV with every column typed as nullable Utf8, after checking
/// that the `required` columns are present.
fn read_text_columns(
    path: &Path,
    required: &[&'static str],
) -> Result<Vec<RecordBatch>, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }
    let mut file = File::open(path)?;
    let (inferred, _) = Format::default()
        .with_header(true)
        .infer_schema(&mut file, Some(0))?;
    for &column in required {
        if inferred.index_of(column).is_err() {
            return Err(StoreError::Schema {
                path: path.to_path_buf(),
                column,
            });
        }
    }
    file.rewind()?;

    let schema = Schema::new(
        inferred
            .fields()
            .iter()
            .map(|f| Field::new(f.name(), DataType::Utf8, true))
            .collect::<Vec<_>>(),
    );
    let reader = ReaderBuilder::new(Arc::new(schema))
        .with_header(true)
        .build(file)?;
    Ok(reader.collect::<Result<Vec<_>, _>>()?)
}

fn text_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, StoreError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| {
            arrow::error::ArrowError::SchemaError(format!("column '{name}' is not Utf8")).into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviewgrade_core::Label::{Fake, Real};

    fn batch(texts: &[&str]) -> ReviewBatch {
        texts.iter().copied().collect()
    }

    #[test]
    fn save_then_load_preserves_order() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("reviews.csv");
        let reviews = batch(&["Great kettle", "Stopped working, sadly", "5", "Loved it"]);

        save_reviews(&reviews, &path).unwrap();
        let loaded = load_reviews(&path).unwrap();
        assert_eq!(loaded, reviews);
    }

    #[test]
    fn quoting_survives_commas_quotes_and_newlines() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("reviews.csv");
        let reviews = batch(&[
            "Cheap, cheerful, works",
            "She said \"buy it\"",
            "line one\nline two",
        ]);

        save_reviews(&reviews, &path).unwrap();
        assert_eq!(load_reviews(&path).unwrap(), reviews);
    }

    #[test]
    fn file_has_review_header() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("reviews.csv");
        save_reviews(&batch(&["a"]), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("review\n"), "got {text:?}");
    }

    #[test]
    fn save_overwrites_existing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("reviews.csv");
        save_reviews(&batch(&["old one", "old two", "old three"]), &path).unwrap();
        save_reviews(&batch(&["new"]), &path).unwrap();
        assert_eq!(load_reviews(&path).unwrap(), batch(&["new"]));
    }

    #[test]
    fn load_without_review_column_is_schema_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bad.csv");
        std::fs::write(&path, "text,stars\nnice,5\n").unwrap();

        let err = load_reviews(&path).unwrap_err();
        assert!(
            matches!(err, StoreError::Schema { column: "review", .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn load_ignores_extra_columns() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("extra.csv");
        std::fs::write(&path, "stars,review\n5,nice\n1,awful\n").unwrap();
        assert_eq!(load_reviews(&path).unwrap(), batch(&["nice", "awful"]));
    }

    #[test]
    fn load_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = load_reviews(&tmp.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn processed_table_keeps_null_prediction_rows() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bert-base-uncased_processed_reviews.csv");
        let reviews = batch(&["good", "   ", "bad"]);
        let predictions = vec![Some(Real), None, Some(Fake)];

        save_processed(&reviews, &predictions, &path).unwrap();
        let (_, loaded) = load_predictions(&path).unwrap();
        assert_eq!(loaded, predictions);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("review,prediction\n"), "got {text:?}");
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn processed_length_mismatch_is_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("p.csv");
        let err = save_processed(&batch(&["a", "b"]), &[Some(Real)], &path).unwrap_err();
        assert!(matches!(
            err,
            StoreError::LengthMismatch {
                rows: 2,
                predictions: 1
            }
        ));
        assert!(!path.exists());
    }

    #[test]
    fn out_of_range_prediction_is_invalid() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("p.csv");
        std::fs::write(&path, "review,prediction\nok,0\nodd,7\n").unwrap();
        let err = load_predictions(&path).unwrap_err();
        assert!(
            matches!(err, StoreError::InvalidValue { row: 1, .. }),
            "got {err:?}"
        );
    }
}
