//! Pagination of a single leaf range
//!
//! Every leaf consumes exactly `page_count` global indices. Pages before the
//! resume point are counted without a request; an empty page or repeat-page
//! termination consumes the rest of the leaf's indices in one step.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::crawl_context::CrawlContext;
use crate::application::normalizer::RecordNormalizer;
use crate::domain::repeat_state::RepeatState;
use crate::domain::search_range::SearchRange;
use crate::domain::seen_set::{MatchKey, RepeatKey};
use crate::domain::services::{PageSink, RawMatch, SearchQuery, WineApi};
use crate::domain::wine_record::WineRecord;

/// How a leaf walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafOutcome {
    /// Every page lay before the resume point; no request was made
    Skipped,
    /// All `page_count` pages were visited
    Exhausted,
    /// Page `local_page` returned no matches
    EmptyPage { local_page: u32 },
    /// Page `local_page` was the last of too many consecutive repeat pages
    RepeatTerminated { local_page: u32 },
}

pub struct PageWalker {
    api: Arc<dyn WineApi>,
    normalizer: RecordNormalizer,
    base_query: SearchQuery,
    repeat_key: RepeatKey,
    duplicate_threshold: u32,
}

impl PageWalker {
    pub fn new(api: Arc<dyn WineApi>, base_query: SearchQuery, repeat_key: RepeatKey, duplicate_threshold: u32) -> Self {
        Self {
            normalizer: RecordNormalizer::new(api.clone()),
            api,
            base_query,
            repeat_key,
            duplicate_threshold,
        }
    }

    pub async fn walk(
        &self,
        ctx: &mut CrawlContext,
        sink: &mut dyn PageSink,
        range: SearchRange,
        page_count: u32,
    ) -> LeafOutcome {
        if ctx.tracker.skips_whole_leaf(page_count) {
            debug!("⏭️  Skipping leaf {} ({} pages) before start page {}", range, page_count, ctx.tracker.start_page());
            ctx.tracker.advance_by(page_count);
            ctx.stats.leaves_skipped += 1;
            return LeafOutcome::Skipped;
        }

        ctx.stats.leaves_walked += 1;
        let mut state = RepeatState::Active;

        for local_page in 1..=page_count {
            if ctx.tracker.should_skip() {
                ctx.tracker.advance();
                ctx.stats.pages_skipped += 1;
                continue;
            }

            let global_page = ctx.tracker.current();
            let query = self.base_query.for_range(range).with_page(local_page);
            let page = match self.api.search(&query).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("⚠️  Page {} of {} failed: {}", local_page, range, e);
                    ctx.stats.pages_failed += 1;
                    ctx.tracker.advance();
                    continue;
                }
            };
            ctx.stats.pages_fetched += 1;

            if page.matches.is_empty() {
                info!("🏁 {} has no results on page {}, leaf done", range, local_page);
                ctx.stats.leaves_ended_empty += 1;
                ctx.tracker.advance_by(page_count - local_page + 1);
                return LeafOutcome::EmptyPage { local_page };
            }

            let keys: Vec<MatchKey> = page
                .matches
                .iter()
                .filter_map(|m| m.repeat_key(self.repeat_key))
                .collect();
            let fresh = ctx.seen.novel(&keys);

            if fresh.is_empty() {
                state = state.on_repeat(self.duplicate_threshold);
                ctx.stats.duplicate_pages += 1;
                if state.is_terminated() {
                    warn!(
                        "🔁 {} repeated earlier results {} times in a row, leaf done at page {}",
                        range, self.duplicate_threshold, local_page
                    );
                    ctx.stats.leaves_ended_repeat += 1;
                    ctx.tracker.advance_by(page_count - local_page + 1);
                    return LeafOutcome::RepeatTerminated { local_page };
                }
                debug!("🔁 Page {} of {} only repeats seen wines ({:?})", local_page, range, state);
                ctx.tracker.advance();
                continue;
            }

            state = state.on_novel();
            ctx.seen.extend(fresh);
            self.process_page(ctx, sink, global_page, &page.matches).await;
            ctx.tracker.advance();
        }

        LeafOutcome::Exhausted
    }

    async fn process_page(&self, ctx: &mut CrawlContext, sink: &mut dyn PageSink, global_page: u32, matches: &[RawMatch]) {
        let mut records: Vec<WineRecord> = Vec::with_capacity(matches.len());
        for raw in matches {
            records.push(self.normalizer.normalize(raw, &mut ctx.dumps).await);
        }

        for (label, payload) in ctx.dumps.take_pending() {
            if let Err(e) = sink.write_debug(&label, &payload).await {
                warn!("⚠️  Failed to save {} sample: {:#}", label, e);
            }
        }

        match sink.write_page(global_page, &records).await {
            Ok(()) => {
                ctx.stats.pages_written += 1;
                ctx.stats.records_written += records.len() as u64;
                info!("✅ Page {} saved ({} wines)", global_page, records.len());
            }
            Err(e) => {
                ctx.stats.sink_failures += 1;
                warn!("❌ Failed to save page {}: {:#}", global_page, e);
            }
        }
    }
}
