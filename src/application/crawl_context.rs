//! Shared mutable state of one crawl
//!
//! The splitter and the walker both operate on the same `CrawlContext`
//! instance: the global page counter, the seen set, the debug capture
//! flags and the run counters all live here.

use serde::Serialize;

use crate::application::normalizer::DebugDumps;
use crate::domain::resume_tracker::ResumeTracker;
use crate::domain::seen_set::SeenSet;

/// Counters collected while crawling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    pub ranges_split: u32,
    pub ranges_abandoned: u32,
    pub leaves_walked: u32,
    pub leaves_skipped: u32,
    pub leaves_ended_empty: u32,
    pub leaves_ended_repeat: u32,
    pub pages_skipped: u32,
    pub pages_fetched: u32,
    pub pages_failed: u32,
    pub duplicate_pages: u32,
    pub pages_written: u32,
    pub records_written: u64,
    pub sink_failures: u32,
}

#[derive(Debug)]
pub struct CrawlContext {
    pub tracker: ResumeTracker,
    pub seen: SeenSet,
    pub dumps: DebugDumps,
    pub stats: CrawlStats,
}

impl CrawlContext {
    pub fn new(start_page: u32, debug_dumps: bool) -> Self {
        Self {
            tracker: ResumeTracker::new(start_page),
            seen: SeenSet::new(),
            dumps: DebugDumps::new(debug_dumps),
            stats: CrawlStats::default(),
        }
    }

    pub fn summary(&self) -> CrawlSummary {
        CrawlSummary {
            start_page: self.tracker.start_page(),
            pages_visited: self.tracker.pages_visited(),
            next_page: self.tracker.current(),
            unique_matches: self.seen.len(),
            stats: self.stats.clone(),
        }
    }
}

/// Result of a finished crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    pub start_page: u32,
    /// Pages conceptually visited, skipped or not
    pub pages_visited: u32,
    /// Global index the next page would have received
    pub next_page: u32,
    pub unique_matches: usize,
    pub stats: CrawlStats,
}
