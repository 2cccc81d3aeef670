//! Extraction layer: fetch a product page and pull out its title and review bodies.

pub mod client;
pub mod page;

pub use client::{FetchError, ReviewScraper, ScrapeConfig};
pub use page::{DEFAULT_PRODUCT_NAME, PageSelectors, ScrapedPage, parse_product_page};
