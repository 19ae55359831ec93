//! Crawl-wide page numbering and start-offset skipping.
//!
//! Global page indices are 1-based and contiguous across all leaf ranges. A
//! page whose index is below `start_page` is counted but not fetched, so a
//! resumed run numbers its output exactly like a from-scratch run would.

/// Index of the first page of a crawl.
pub const FIRST_PAGE_INDEX: u32 = 1;

#[derive(Debug, Clone)]
pub struct ResumeTracker {
    current: u32,
    start_page: u32,
}

impl ResumeTracker {
    /// `start_page` of 0 or 1 means nothing is skipped.
    pub fn new(start_page: u32) -> Self {
        Self {
            current: FIRST_PAGE_INDEX,
            start_page: start_page.max(FIRST_PAGE_INDEX),
        }
    }

    /// Global index of the page about to be visited.
    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn start_page(&self) -> u32 {
        self.start_page
    }

    pub fn should_skip(&self) -> bool {
        self.current < self.start_page
    }

    /// True when every one of the next `page_count` pages lies before `start_page`.
    pub fn skips_whole_leaf(&self, page_count: u32) -> bool {
        self.current.saturating_add(page_count) <= self.start_page
    }

    pub fn advance(&mut self) {
        self.advance_by(1);
    }

    pub fn advance_by(&mut self, pages: u32) {
        self.current = self.current.saturating_add(pages);
    }

    /// Number of pages visited (skipped or processed) so far.
    pub fn pages_visited(&self) -> u32 {
        self.current - FIRST_PAGE_INDEX
    }
}

impl Default for ResumeTracker {
    fn default() -> Self {
        Self::new(FIRST_PAGE_INDEX)
    }
}
