//! Application layer module
//!
//! The crawl core: range splitting, leaf pagination and record
//! normalisation, all driven through the `WineApi` and `PageSink` seams.

pub mod crawl_context;
pub mod crawler;
pub mod normalizer;
pub mod page_walker;
pub mod range_splitter;

pub use crawl_context::{CrawlContext, CrawlStats, CrawlSummary};
pub use crawler::WineCrawler;
pub use normalizer::{DebugDumps, RecordNormalizer};
pub use page_walker::{LeafOutcome, PageWalker};
pub use range_splitter::{RangeSplitter, SplitDecision};
