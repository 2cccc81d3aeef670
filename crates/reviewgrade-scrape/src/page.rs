//! HTML parsing for product pages.

use reviewgrade_core::ReviewBatch;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::FetchError;

/// Product name used when the page has no title element (or the fetch failed).
pub const DEFAULT_PRODUCT_NAME: &str = "Unknown Product";

/// Default CSS selector for the product title.
pub const TITLE_SELECTOR: &str = "span#productTitle";
/// Default CSS selector for review bodies.
pub const REVIEW_SELECTOR: &str = r#"span[data-hook="review-body"]"#;

/// What was extracted from one product page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedPage {
    pub product_name: String,
    pub reviews: ReviewBatch,
}

impl ScrapedPage {
    /// The result reported when nothing could be fetched.
    pub fn empty() -> Self {
        Self {
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
            reviews: ReviewBatch::new(),
        }
    }
}

/// Compiled selectors locating the title and review elements.
#[derive(Debug, Clone)]
pub struct PageSelectors {
    title: Selector,
    review: Selector,
}

impl PageSelectors {
    pub fn new(title: &str, review: &str) -> Result<Self, FetchError> {
        Ok(Self {
            title: parse_selector(title)?,
            review: parse_selector(review)?,
        })
    }
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            title: Selector::parse(TITLE_SELECTOR).expect("static title selector"),
            review: Selector::parse(REVIEW_SELECTOR).expect("static review selector"),
        }
    }
}

fn parse_selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// Extract the product name and review texts from a page body.
///
/// Reviews keep document order. Elements whose text is empty after
/// whitespace collapsing are skipped.
pub fn parse_product_page(html: &str, selectors: &PageSelectors) -> ScrapedPage {
    let document = Html::parse_document(html);

    let product_name = document
        .select(&selectors.title)
        .map(element_text)
        .find(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_PRODUCT_NAME.to_string());

    let mut found = 0usize;
    let reviews: ReviewBatch = document
        .select(&selectors.review)
        .inspect(|_| found += 1)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();

    debug!(found, kept = reviews.len(), product = %product_name, "parsed product page");
    if found == 0 {
        warn!("no review elements found; page structure may have changed");
    }

    ScrapedPage {
        product_name,
        reviews,
    }
}

/// Visible text of an element with runs of whitespace collapsed to one space.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
