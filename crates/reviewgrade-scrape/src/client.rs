//! HTTP client for product pages.

use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::page::{PageSelectors, REVIEW_SELECTOR, ScrapedPage, TITLE_SELECTOR, parse_product_page};

/// Desktop browser user agents; one is picked per [`ScrapeConfig::default`].
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/113.0.0.0 Safari/537.36",
];

const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}; the request was likely blocked")]
    Status { status: u16 },
    #[error("invalid CSS selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },
    #[error("invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
}

/// Request headers, timeout, and selectors used for every fetch.
///
/// Built once and handed to [`ReviewScraper::new`]; nothing here is global.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub user_agent: String,
    pub accept_language: String,
    pub timeout: Duration,
    pub title_selector: String,
    pub review_selector: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        let user_agent = USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);
        Self {
            user_agent: user_agent.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            title_selector: TITLE_SELECTOR.to_string(),
            review_selector: REVIEW_SELECTOR.to_string(),
        }
    }
}

/// Fetches a product page with browser-like headers and extracts its reviews.
pub struct ReviewScraper {
    client: reqwest::Client,
    selectors: PageSelectors,
}

impl ReviewScraper {
    pub fn new(config: ScrapeConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)?,
        );
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;
        let selectors = PageSelectors::new(&config.title_selector, &config.review_selector)?;
        Ok(Self { client, selectors })
    }

    /// Fetch a single page and parse it.
    ///
    /// Any status other than 200 is a [`FetchError::Status`].
    pub async fn try_fetch(&self, url: &str) -> Result<ScrapedPage, FetchError> {
        info!(url, "fetching product page");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }
        let body = resp.text().await?;
        let page = parse_product_page(&body, &self.selectors);
        info!(count = page.reviews.len(), product = %page.product_name, "extracted reviews");
        Ok(page)
    }

    /// Fetch a page, never failing.
    ///
    /// Blocked requests and transport errors are logged and reported as an
    /// empty page with the placeholder product name.
    pub async fn fetch_reviews(&self, url: &str) -> ScrapedPage {
        match self.try_fetch(url).await {
            Ok(page) => page,
            Err(FetchError::Status { status }) => {
                warn!(url, status, "product page request blocked");
                ScrapedPage::empty()
            }
            Err(e) => {
                error!(url, error = %e, "error fetching reviews");
                ScrapedPage::empty()
            }
        }
    }
}
