//! Domain module - Core crawl types and state machines
//!
//! This module contains the value objects and the small state machines that
//! the crawler is built from. Nothing in here performs I/O.
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod api_error;
pub mod json_path;
pub mod services;
pub mod search_range;
pub mod wine_record;
pub mod seen_set;
pub mod repeat_state;
pub mod resume_tracker;
pub mod dedup;
pub mod flatten;

// Re-export commonly used items for convenience
pub use api_error::{ApiError, ApiResult};
pub use services::{WineApi, PageSink, SearchQuery, SearchPage, RawMatch};
pub use search_range::SearchRange;
pub use wine_record::{Vintage, WineRecord, WinePage, CSV_COLUMNS};
pub use seen_set::{SeenSet, RepeatKey, MatchKey};
pub use repeat_state::RepeatState;
pub use resume_tracker::ResumeTracker;
pub use dedup::{dedupe_records, RecordKey};
pub use flatten::flatten_records;
