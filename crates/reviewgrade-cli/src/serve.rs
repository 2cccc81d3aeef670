//! HTTP front door: one route per model variant, JSON responses.
//!
//! `GET /<variant>?url=...` and `POST /<variant>` (form field `url`) run the
//! pipeline and answer with the grade. Runs are serialised behind a single
//! lock because every run rewrites the same intermediate review file.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodRouter, get};
use axum::{Json, Router};
use reviewgrade_ai::{ModelLoadError, SequenceClassifier};
use reviewgrade_core::ModelVariant;
use reviewgrade_scrape::ReviewScraper;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::pipeline::{RunOutcome, run_pipeline};

const NO_REVIEWS_MESSAGE: &str = "No reviews found or the request was blocked.";

/// Loads (or fetches from a cache) the classifier for one variant.
pub type ClassifierLoader<C> =
    Arc<dyn Fn(ModelVariant) -> Result<Arc<Mutex<C>>, ModelLoadError> + Send + Sync>;

pub struct AppState<C> {
    scraper: Arc<ReviewScraper>,
    work_dir: PathBuf,
    load_classifier: ClassifierLoader<C>,
    run_lock: Arc<tokio::sync::Mutex<()>>,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            scraper: Arc::clone(&self.scraper),
            work_dir: self.work_dir.clone(),
            load_classifier: Arc::clone(&self.load_classifier),
            run_lock: Arc::clone(&self.run_lock),
        }
    }
}

impl<C> AppState<C> {
    pub fn new<F>(scraper: ReviewScraper, work_dir: PathBuf, load_classifier: F) -> Self
    where
        F: Fn(ModelVariant) -> Result<Arc<Mutex<C>>, ModelLoadError> + Send + Sync + 'static,
    {
        Self {
            scraper: Arc::new(scraper),
            work_dir,
            load_classifier: Arc::new(load_classifier),
            run_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UrlParams {
    url: Option<String>,
}

#[derive(Debug, Serialize)]
struct GradeResponse {
    url: String,
    product_name: String,
    variant: ModelVariant,
    real_count: u64,
    fake_count: u64,
    grade: String,
    grade_color: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

pub fn router<C>(state: AppState<C>) -> Router
where
    C: SequenceClassifier + Send + 'static,
{
    let mut router = Router::new();
    for variant in ModelVariant::ALL {
        router = router.route(&format!("/{}", variant.slug()), variant_route(variant));
    }
    router.with_state(state)
}

fn variant_route<C>(variant: ModelVariant) -> MethodRouter<AppState<C>>
where
    C: SequenceClassifier + Send + 'static,
{
    get(
        move |State(state): State<AppState<C>>, Query(params): Query<UrlParams>| async move {
            grade_url(state, variant, params.url).await
        },
    )
    .post(
        move |State(state): State<AppState<C>>, Form(params): Form<UrlParams>| async move {
            grade_url(state, variant, params.url).await
        },
    )
}

async fn grade_url<C>(state: AppState<C>, variant: ModelVariant, url: Option<String>) -> Response
where
    C: SequenceClassifier + Send + 'static,
{
    let Some(url) = url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "No URL provided");
    };

    let _guard = state.run_lock.lock().await;
    let load = Arc::clone(&state.load_classifier);
    let outcome =
        run_pipeline(&state.scraper, &url, variant, &state.work_dir, move |v| load(v)).await;

    match outcome {
        Ok(RunOutcome::Graded(report)) => {
            let result = report.result;
            Json(GradeResponse {
                url,
                product_name: report.product_name.unwrap_or_default(),
                variant,
                real_count: result.real_count,
                fake_count: result.fake_count,
                grade: result.grade.to_string(),
                grade_color: result.color(),
            })
            .into_response()
        }
        Ok(RunOutcome::NoReviews { .. }) => error_response(StatusCode::OK, NO_REVIEWS_MESSAGE),
        Err(e) => {
            error!(%url, %variant, error = %format!("{e:#}"), "grading failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
        }
    }
}

/// Bind and serve until the process is stopped.
pub async fn serve<C>(state: AppState<C>, addr: SocketAddr) -> anyhow::Result<()>
where
    C: SequenceClassifier + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
