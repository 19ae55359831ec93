//! Vivino Harvest - adaptive price-range crawler
//!
//! Crawls a result-window-capped search API by recursively halving the
//! price filter until every range can be paged completely, writing one
//! JSON file per page under a crawl-wide page index.

// Module declarations
pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod commands;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use application::{CrawlContext, CrawlSummary, WineCrawler};
pub use commands::{run, Cli};
