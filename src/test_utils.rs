//! Test utilities for the crawler
//!
//! `ScriptedApi` is an in-memory wine catalogue answering search, tastes and
//! reviews requests the way the real API does (range filters, pagination,
//! optional failures and stuck pagination). `MemorySink` keeps written pages
//! in memory.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::domain::search_range::SearchRange;
use crate::domain::services::{PageSink, RawMatch, SearchPage, SearchQuery, WineApi};
use crate::domain::wine_record::WineRecord;
use crate::domain::api_error::{ApiError, ApiResult};

/// Raw search match for a catalogue wine.
pub fn wine_match(wine_id: u64, price: f64) -> Value {
    json!({
        "vintage": {
            "name": format!("Wine {} {}", wine_id, 2000 + wine_id % 20),
            "year": 2000 + wine_id % 20,
            "statistics": {"ratings_average": 3.5, "ratings_count": wine_id},
            "wine": {
                "id": wine_id,
                "region": {"country": {"name": "Portugal"}},
                "winery": {"name": "Quinta Teste"},
                "style": {"grapes": [{"name": "Touriga Nacional"}]}
            }
        },
        "price": {"amount": price}
    })
}

/// Scripted `WineApi` over a fixed catalogue of `(wine_id, price)` pairs.
#[derive(Default)]
pub struct ScriptedApi {
    wines: Vec<(u64, f64)>,
    window_cap: Option<usize>,
    stick_after: Option<u32>,
    failing_pages: HashSet<u32>,
    failing_counts: Vec<SearchRange>,
    tastes: HashMap<u64, Value>,
    reviews: HashMap<u64, Value>,
    queries: Mutex<Vec<SearchQuery>>,
    detail_calls: AtomicUsize,
}

impl ScriptedApi {
    /// Empty catalogue; every detail request fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wines `1..=count`, wine `i` priced `i * price_step`.
    pub fn with_catalogue(count: u64, price_step: f64) -> Self {
        Self::new().with_wines((1..=count).map(|id| (id, id as f64 * price_step)).collect())
    }

    pub fn with_wines(mut self, wines: Vec<(u64, f64)>) -> Self {
        self.wines = wines;
        self
    }

    /// Only the first `cap` matches of a filter combination are reachable by paging.
    pub fn with_window_cap(mut self, cap: usize) -> Self {
        self.window_cap = Some(cap);
        self
    }

    /// Pages after `page` keep returning the content of `page`.
    pub fn stick_after(mut self, page: u32) -> Self {
        self.stick_after = Some(page);
        self
    }

    /// Page fetches for `page` fail in every range.
    pub fn fail_page(mut self, page: u32) -> Self {
        self.failing_pages.insert(page);
        self
    }

    /// Count queries for exactly `range` fail.
    pub fn fail_count(mut self, range: SearchRange) -> Self {
        self.failing_counts.push(range);
        self
    }

    pub fn with_tastes(mut self, wine_id: u64, payload: Value) -> Self {
        self.tastes.insert(wine_id, payload);
        self
    }

    pub fn with_reviews(mut self, wine_id: u64, payload: Value) -> Self {
        self.reviews.insert(wine_id, payload);
        self
    }

    /// Every search query received, in order.
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// `page` values of page fetches, in order.
    pub fn page_requests(&self) -> Vec<u32> {
        self.queries().iter().filter_map(|q| q.page).collect()
    }

    /// Ranges of count queries (no `page` filter), in order.
    pub fn count_requests(&self) -> Vec<SearchRange> {
        self.queries()
            .iter()
            .filter(|q| q.page.is_none())
            .filter_map(|q| q.range)
            .collect()
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    fn in_range(&self, range: Option<SearchRange>) -> Vec<(u64, f64)> {
        self.wines
            .iter()
            .copied()
            .filter(|(_, price)| range.map_or(true, |r| r.contains(*price)))
            .collect()
    }

    fn detail(&self, store: &HashMap<u64, Value>, wine_id: u64, kind: &str) -> ApiResult<Value> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        store
            .get(&wine_id)
            .cloned()
            .ok_or_else(|| ApiError::http_status(&format!("scripted://wines/{}/{}", wine_id, kind), 404))
    }
}

#[async_trait]
impl WineApi for ScriptedApi {
    async fn search(&self, query: &SearchQuery) -> ApiResult<SearchPage> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());

        let url = "scripted://explore";
        match (query.page, query.range) {
            (None, Some(range)) if self.failing_counts.contains(&range) => {
                return Err(ApiError::transport(url, "scripted count failure"));
            }
            (Some(page), _) if self.failing_pages.contains(&page) => {
                return Err(ApiError::http_status(url, 500));
            }
            _ => {}
        }

        let matching = self.in_range(query.range);
        let reachable = match self.window_cap {
            Some(cap) => &matching[..matching.len().min(cap)],
            None => &matching[..],
        };

        let page = query.page.unwrap_or(1).max(1);
        let page = self.stick_after.map_or(page, |last| page.min(last));
        let per_page = query.per_page.max(1) as usize;
        let start = (page as usize - 1).saturating_mul(per_page);

        let matches = reachable
            .iter()
            .skip(start)
            .take(per_page)
            .map(|(id, price)| RawMatch(wine_match(*id, *price)))
            .collect();

        Ok(SearchPage {
            records_matched: matching.len() as u64,
            matches,
        })
    }

    async fn tastes(&self, wine_id: u64) -> ApiResult<Value> {
        self.detail(&self.tastes, wine_id, "tastes")
    }

    async fn reviews(&self, wine_id: u64) -> ApiResult<Value> {
        self.detail(&self.reviews, wine_id, "reviews")
    }
}

/// In-memory `PageSink`.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub pages: Vec<(u32, Vec<WineRecord>)>,
    pub debug: Vec<(String, Value)>,
    fail_writes: bool,
}

impl MemorySink {
    /// A sink whose page writes always fail.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Default::default()
        }
    }

    pub fn page_indices(&self) -> Vec<u32> {
        self.pages.iter().map(|(index, _)| *index).collect()
    }

    pub fn page(&self, index: u32) -> Option<&[WineRecord]> {
        self.pages
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, records)| records.as_slice())
    }

    pub fn records(&self) -> Vec<WineRecord> {
        self.pages.iter().flat_map(|(_, records)| records.clone()).collect()
    }

    pub fn record_count(&self) -> usize {
        self.pages.iter().map(|(_, records)| records.len()).sum()
    }
}

#[async_trait]
impl PageSink for MemorySink {
    async fn write_page(&mut self, page_index: u32, records: &[WineRecord]) -> Result<()> {
        if self.fail_writes {
            return Err(anyhow!("scripted write failure for page {}", page_index));
        }
        self.pages.push((page_index, records.to_vec()));
        Ok(())
    }

    async fn write_debug(&mut self, label: &str, payload: &Value) -> Result<()> {
        self.debug.push((label.to_string(), payload.clone()));
        Ok(())
    }
}
