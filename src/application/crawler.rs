//! Adaptive price-range crawl
//!
//! Explores `[0, price_max)` depth first. Each range is counted, then either
//! halved (count at the result-window cap) or paged as a leaf. Ranges are
//! processed left before right, so global page numbers only depend on the
//! shape of the range tree.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{debug, info, warn};

use crate::application::crawl_context::{CrawlContext, CrawlSummary};
use crate::application::page_walker::{LeafOutcome, PageWalker};
use crate::application::range_splitter::{RangeSplitter, SplitDecision};
use crate::domain::search_range::SearchRange;
use crate::domain::services::{PageSink, SearchQuery, WineApi};
use crate::infrastructure::config::{CrawlerConfig, FilterConfig};

pub struct WineCrawler {
    api: Arc<dyn WineApi>,
    splitter: RangeSplitter,
    walker: PageWalker,
    base_query: SearchQuery,
    price_max: f64,
}

impl WineCrawler {
    pub fn new(api: Arc<dyn WineApi>, crawler: &CrawlerConfig, filters: &FilterConfig) -> Self {
        let base_query = SearchQuery::new(
            filters.country_codes.clone(),
            filters.wine_type_ids.clone(),
            crawler.records_per_page,
        );

        Self {
            walker: PageWalker::new(
                api.clone(),
                base_query.clone(),
                crawler.repeat_key,
                crawler.duplicate_page_threshold,
            ),
            splitter: RangeSplitter::from_config(crawler),
            api,
            base_query,
            price_max: crawler.price_max,
        }
    }

    /// Crawl the whole price domain.
    pub async fn run(&self, ctx: &mut CrawlContext, sink: &mut dyn PageSink) -> Result<CrawlSummary> {
        let root = SearchRange::full(self.price_max)
            .ok_or_else(|| anyhow!("price_max must be a positive finite number, got {}", self.price_max))?;

        info!("🚀 Starting crawl over {} from page {}", root, ctx.tracker.start_page());
        self.split(ctx, sink, root).await;

        let summary = ctx.summary();
        info!(
            "🎉 Crawl finished: {} pages visited, {} written, {} records, {} ranges abandoned",
            summary.pages_visited, summary.stats.pages_written, summary.stats.records_written, summary.stats.ranges_abandoned
        );
        Ok(summary)
    }

    /// Count, split or walk `range` and everything below it.
    ///
    /// Uses an explicit stack: the right half is pushed first so the left
    /// half is always finished before its sibling starts.
    pub async fn split(&self, ctx: &mut CrawlContext, sink: &mut dyn PageSink, range: SearchRange) {
        let mut pending = vec![range];

        while let Some(range) = pending.pop() {
            let matched = match self.api.search(&self.base_query.for_range(range)).await {
                Ok(page) => page.records_matched,
                Err(e) => {
                    warn!("⚠️  Count query for {} failed, abandoning range: {}", range, e);
                    ctx.stats.ranges_abandoned += 1;
                    continue;
                }
            };

            match self.splitter.decide(range, matched) {
                SplitDecision::Split(left, right) => {
                    debug!("✂️  {} has {} matches, splitting at {:.2}", range, matched, left.max);
                    ctx.stats.ranges_split += 1;
                    pending.push(right);
                    pending.push(left);
                }
                SplitDecision::Leaf { page_count } => {
                    info!("📄 {} has {} matches, walking {} pages", range, matched, page_count);
                    let outcome = self.walker.walk(ctx, sink, range, page_count).await;
                    if outcome != LeafOutcome::Skipped {
                        debug!("Leaf {} finished: {:?}", range, outcome);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MemorySink, ScriptedApi};

    fn config(cap: u64, price_max: f64) -> CrawlerConfig {
        CrawlerConfig {
            records_per_page: 10,
            result_window_cap: cap,
            price_max,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_range_under_cap_is_a_single_leaf() {
        let api = Arc::new(ScriptedApi::with_catalogue(30, 1.0));
        let crawler = WineCrawler::new(api.clone(), &config(2000, 100.0), &FilterConfig::default());
        let mut ctx = CrawlContext::new(1, false);
        let mut sink = MemorySink::default();

        let summary = crawler.run(&mut ctx, &mut sink).await.unwrap();

        assert_eq!(api.count_requests(), vec![SearchRange::new(0.0, 100.0).unwrap()]);
        assert_eq!(summary.stats.ranges_split, 0);
        assert_eq!(summary.pages_visited, 4);
        assert_eq!(sink.record_count(), 30);
    }

    #[tokio::test]
    async fn test_over_cap_splits_left_then_right() {
        let api = Arc::new(ScriptedApi::with_catalogue(40, 1.0));
        let crawler = WineCrawler::new(api.clone(), &config(30, 80.0), &FilterConfig::default());
        let mut ctx = CrawlContext::new(1, false);
        let mut sink = MemorySink::default();

        crawler.run(&mut ctx, &mut sink).await.unwrap();

        let range = |min, max| SearchRange::new(min, max).unwrap();
        assert_eq!(
            api.count_requests(),
            vec![
                range(0.0, 80.0),
                range(0.0, 40.0),
                range(0.0, 20.0),
                range(20.0, 40.0),
                range(40.0, 80.0),
            ]
        );
        assert_eq!(ctx.stats.ranges_split, 2);
        assert_eq!(sink.record_count(), 40);
    }

    #[tokio::test]
    async fn test_failed_count_abandons_range() {
        let api = Arc::new(ScriptedApi::with_catalogue(10, 1.0).fail_count(SearchRange::new(0.0, 50.0).unwrap()));
        let crawler = WineCrawler::new(api.clone(), &config(2000, 50.0), &FilterConfig::default());
        let mut ctx = CrawlContext::new(1, false);
        let mut sink = MemorySink::default();

        let summary = crawler.run(&mut ctx, &mut sink).await.unwrap();

        assert_eq!(summary.stats.ranges_abandoned, 1);
        assert_eq!(summary.pages_visited, 0);
        assert!(api.page_requests().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_price_max_is_an_error() {
        let crawler = WineCrawler::new(Arc::new(ScriptedApi::new()), &config(2000, 0.0), &FilterConfig::default());
        let mut ctx = CrawlContext::new(1, false);
        assert!(crawler.run(&mut ctx, &mut MemorySink::default()).await.is_err());
    }
}
