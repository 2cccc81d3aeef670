mod display;
mod pipeline;
mod serve;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reviewgrade_ai::OnnxClassifier;
use reviewgrade_core::ModelVariant;
use reviewgrade_scrape::{ReviewScraper, ScrapeConfig};
use tracing_subscriber::EnvFilter;

use crate::pipeline::{GradeReport, RunOutcome};

#[derive(Parser)]
#[command(name = "reviewgrade", version, about = "Grade product reviews as real or fake")]
struct Cli {
    /// Directory holding one exported checkpoint per variant (`Bert/`, `XLnet/`).
    #[arg(
        long,
        env = "REVIEWGRADE_MODELS_DIR",
        default_value = "model_checkpoints",
        global = true
    )]
    models_dir: PathBuf,

    /// Directory for the intermediate and processed review tables.
    #[arg(long, env = "REVIEWGRADE_WORK_DIR", default_value = ".", global = true)]
    work_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape a product page and grade its reviews.
    Grade {
        url: String,
        /// Model variant: bert or xlnet.
        #[arg(long, short, default_value = "bert")]
        variant: ModelVariant,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Grade an existing CSV with a `review` column.
    Classify {
        path: PathBuf,
        #[arg(long, short, default_value = "bert")]
        variant: ModelVariant,
        #[arg(long)]
        json: bool,
    },
    /// Serve `/bert` and `/xlnet` grading endpoints.
    Serve {
        #[arg(long, env = "REVIEWGRADE_BIND", default_value = "127.0.0.1:5000")]
        bind: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("reviewgrade v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let Cli {
        models_dir,
        work_dir,
        command,
    } = cli;

    match command {
        Command::Grade { url, variant, json } => {
            let scraper = ReviewScraper::new(ScrapeConfig::default())?;
            let outcome = pipeline::run_pipeline(&scraper, &url, variant, &work_dir, move |v| {
                OnnxClassifier::cached(v, &models_dir)
            })
            .await?;
            match outcome {
                RunOutcome::Graded(report) => emit(&report, json)?,
                RunOutcome::NoReviews { product_name } => {
                    eprintln!("No reviews found for {product_name} or the request was blocked.");
                    std::process::exit(2);
                }
            }
        }
        Command::Classify {
            path,
            variant,
            json,
        } => {
            let report = tokio::task::spawn_blocking(move || {
                pipeline::grade_file(&path, variant, &work_dir, |v| {
                    OnnxClassifier::cached(v, &models_dir)
                })
            })
            .await??;
            emit(&report, json)?;
        }
        Command::Serve { bind } => {
            let scraper = ReviewScraper::new(ScrapeConfig::default())?;
            let state = serve::AppState::new(scraper, work_dir, move |v| {
                OnnxClassifier::cached(v, &models_dir)
            });
            serve::serve(state, bind).await?;
        }
    }

    Ok(())
}

fn emit(report: &GradeReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        display::print_report(report);
    }
    Ok(())
}
