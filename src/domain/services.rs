//! Collaborator interfaces used by the crawl core
//!
//! `WineApi` is the upstream search service; `PageSink` receives processed
//! pages. The core only talks to these traits, so tests can script both.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::json_path::{lookup, lookup_i64_lenient, lookup_u64};
use crate::domain::search_range::SearchRange;
use crate::domain::seen_set::{MatchKey, RepeatKey};
use crate::domain::wine_record::{Vintage, WineRecord};
use crate::domain::api_error::ApiResult;

/// Filters for one search request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub country_codes: Vec<String>,
    pub wine_type_ids: Vec<u32>,
    pub range: Option<SearchRange>,
    pub page: Option<u32>,
    pub per_page: u32,
}

impl SearchQuery {
    pub fn new(country_codes: Vec<String>, wine_type_ids: Vec<u32>, per_page: u32) -> Self {
        Self {
            country_codes,
            wine_type_ids,
            range: None,
            page: None,
            per_page,
        }
    }

    /// Count query for `range` (no page filter).
    pub fn for_range(&self, range: SearchRange) -> Self {
        Self {
            range: Some(range),
            page: None,
            ..self.clone()
        }
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: Some(page),
            ..self.clone()
        }
    }

    /// Query string pairs in a stable order.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for code in &self.country_codes {
            pairs.push(("country_codes[]".to_string(), code.clone()));
        }
        for id in &self.wine_type_ids {
            pairs.push(("wine_type_ids[]".to_string(), id.to_string()));
        }
        if let Some(range) = self.range {
            pairs.push(("price_range_min".to_string(), range.min.to_string()));
            pairs.push(("price_range_max".to_string(), range.max.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if self.per_page > 0 {
            pairs.push(("per_page".to_string(), self.per_page.to_string()));
        }
        pairs
    }
}

/// One match of a search page, kept as the raw nested JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMatch(pub Value);

impl RawMatch {
    pub fn json(&self) -> &Value {
        &self.0
    }

    pub fn wine_id(&self) -> Option<u64> {
        lookup_u64(&self.0, &["vintage", "wine", "id"])
    }

    /// `vintage.year`, keeping non-numeric values such as `N.V.` as labels.
    pub fn vintage(&self) -> Option<Vintage> {
        lookup(&self.0, &["vintage", "year"]).and_then(Vintage::from_json)
    }

    pub fn year(&self) -> Option<i64> {
        lookup_i64_lenient(&self.0, &["vintage", "year"])
    }

    pub fn wine(&self) -> Option<&Value> {
        lookup(&self.0, &["vintage", "wine"])
    }

    pub fn repeat_key(&self, key: RepeatKey) -> Option<MatchKey> {
        self.wine_id().map(|id| MatchKey::new(key, id, self.year()))
    }
}

/// Parsed search response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub records_matched: u64,
    pub matches: Vec<RawMatch>,
}

/// Upstream wine search API.
#[async_trait]
pub trait WineApi: Send + Sync {
    /// Run a search; used both for range counts and for page fetches.
    async fn search(&self, query: &SearchQuery) -> ApiResult<SearchPage>;

    /// Taste profile payload for a wine.
    async fn tastes(&self, wine_id: u64) -> ApiResult<Value>;

    /// Reviews payload for a wine.
    async fn reviews(&self, wine_id: u64) -> ApiResult<Value>;
}

/// Destination of processed pages.
#[async_trait]
pub trait PageSink: Send {
    /// Persist the records of the page with global index `page_index`.
    async fn write_page(&mut self, page_index: u32, records: &[WineRecord]) -> anyhow::Result<()>;

    /// Persist a diagnostic payload under `label`.
    async fn write_debug(&mut self, label: &str, payload: &Value) -> anyhow::Result<()>;
}
