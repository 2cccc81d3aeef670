//! Review grading pipeline: scrape → save → load → classify → grade.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use reviewgrade_ai::{ClassifyError, ModelLoadError, SequenceClassifier, predict};
use reviewgrade_core::{GradeResult, ModelVariant, grade};
use reviewgrade_scrape::ReviewScraper;
use serde::Serialize;
use tracing::{info, warn};

/// Intermediate review table written by every run, relative to the work dir.
pub const REVIEWS_FILE: &str = "reviews.csv";

/// Result of a graded run.
#[derive(Debug, Clone, Serialize)]
pub struct GradeReport {
    /// URL or file the reviews came from.
    pub source: String,
    pub product_name: Option<String>,
    pub variant: ModelVariant,
    #[serde(flatten)]
    pub result: GradeResult,
    pub processed_path: PathBuf,
    /// Rows left unclassified because they were blank.
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    Graded(GradeReport),
    /// The page was blocked, unreachable, or had no reviews; no model was loaded.
    NoReviews { product_name: String },
}

/// Run the full pipeline for one URL.
///
/// Fetch failures and empty pages short-circuit to [`RunOutcome::NoReviews`]
/// before `load_classifier` is called. Classification runs on the blocking
/// pool.
pub async fn run_pipeline<C, F>(
    scraper: &ReviewScraper,
    url: &str,
    variant: ModelVariant,
    work_dir: &Path,
    load_classifier: F,
) -> anyhow::Result<RunOutcome>
where
    C: SequenceClassifier + Send + 'static,
    F: FnOnce(ModelVariant) -> Result<Arc<Mutex<C>>, ModelLoadError> + Send + 'static,
{
    let page = scraper.fetch_reviews(url).await;
    if page.reviews.is_empty() {
        warn!(url, "no reviews found or the request was blocked");
        return Ok(RunOutcome::NoReviews {
            product_name: page.product_name,
        });
    }

    let reviews_path = work_dir.join(REVIEWS_FILE);
    reviewgrade_store::save_reviews(&page.reviews, &reviews_path)
        .context("saving scraped reviews")?;

    let work_dir = work_dir.to_path_buf();
    let report = tokio::task::spawn_blocking(move || {
        grade_file(&reviews_path, variant, &work_dir, load_classifier)
    })
    .await
    .context("classification task failed")??;

    Ok(RunOutcome::Graded(GradeReport {
        source: url.to_string(),
        product_name: Some(page.product_name),
        ..report
    }))
}

/// Grade an existing review table: load → classify → write processed table → grade.
pub fn grade_file<C, F>(
    reviews_path: &Path,
    variant: ModelVariant,
    work_dir: &Path,
    load_classifier: F,
) -> anyhow::Result<GradeReport>
where
    C: SequenceClassifier,
    F: FnOnce(ModelVariant) -> Result<Arc<Mutex<C>>, ModelLoadError>,
{
    let reviews = reviewgrade_store::load_reviews(reviews_path)
        .with_context(|| format!("loading reviews from {}", reviews_path.display()))?;

    let classifier = load_classifier(variant)?;
    let predictions = {
        let mut clf = classifier.lock().map_err(|_| ClassifyError::Poisoned)?;
        predict(&mut *clf, &reviews).context("classifying reviews")?
    };

    let processed_path = work_dir.join(variant.processed_file_name());
    reviewgrade_store::save_processed(&reviews, &predictions, &processed_path)
        .context("saving processed reviews")?;

    let result = grade(predictions.iter().flatten());
    let skipped = predictions.iter().filter(|p| p.is_none()).count();
    info!(
        %variant,
        real = result.real_count,
        fake = result.fake_count,
        grade = %result.grade,
        skipped,
        "graded reviews"
    );

    Ok(GradeReport {
        source: reviews_path.display().to_string(),
        product_name: None,
        variant,
        result,
        processed_path,
        skipped,
    })
}
