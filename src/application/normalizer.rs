//! Record normalisation
//!
//! Turns one raw search match into a `WineRecord`, enriching it with the
//! tastes and reviews detail endpoints. Missing fields become `None`; a
//! failed detail request degrades the record but never drops it.

use std::cmp::Reverse;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::json_path::{lookup, lookup_array, lookup_f64, lookup_str, lookup_u64};
use crate::domain::services::{RawMatch, WineApi};
use crate::domain::wine_record::WineRecord;

pub const TASTES_LABEL: &str = "tastes";
pub const REVIEWS_LABEL: &str = "reviews";

/// Number of flavor groups kept per record.
const FLAVOR_RANKS: usize = 3;

/// First-success capture of detail payloads, once per crawl.
#[derive(Debug, Default)]
pub struct DebugDumps {
    enabled: bool,
    tastes_captured: bool,
    reviews_captured: bool,
    pending: Vec<(String, Value)>,
}

impl DebugDumps {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Default::default()
        }
    }

    fn offer(&mut self, label: &str, payload: &Value) {
        if !self.enabled {
            return;
        }
        let captured = match label {
            TASTES_LABEL => &mut self.tastes_captured,
            REVIEWS_LABEL => &mut self.reviews_captured,
            _ => return,
        };
        if !*captured {
            *captured = true;
            self.pending.push((label.to_string(), payload.clone()));
        }
    }

    /// Captured payloads not yet handed to a sink.
    pub fn take_pending(&mut self) -> Vec<(String, Value)> {
        std::mem::take(&mut self.pending)
    }
}

/// Build the search-derived part of a record.
pub fn build_record(raw: &RawMatch) -> WineRecord {
    let m = raw.json();
    WineRecord {
        id: raw.wine_id(),
        name: lookup_str(m, &["vintage", "name"]),
        vintage: raw.vintage(),
        country: lookup_str(m, &["vintage", "wine", "region", "country", "name"]),
        winery: lookup_str(m, &["vintage", "wine", "winery", "name"]),
        grapes: grape_names(m),
        rating: lookup_f64(m, &["vintage", "statistics", "ratings_average"]),
        price: lookup_f64(m, &["price", "amount"]),
        reviews_count: lookup_u64(m, &["vintage", "statistics", "ratings_count"]),
        ..Default::default()
    }
}

/// `vintage.wine.style.grapes[].name` joined with `;`, skipping unnamed entries.
fn grape_names(m: &Value) -> Option<String> {
    let grapes = lookup_array(m, &["vintage", "wine", "style", "grapes"])?;
    let names: Vec<String> = grapes
        .iter()
        .filter_map(|grape| lookup_str(grape, &["name"]))
        .filter(|name| !name.is_empty())
        .collect();
    Some(names.join(";"))
}

/// Flavor groups ordered by descending `stats.mentions_count`, ties in input order.
pub fn rank_flavor_groups(flavors: &[Value]) -> Vec<Option<String>> {
    let mut ranked: Vec<&Value> = flavors.iter().collect();
    ranked.sort_by_key(|flavor| Reverse(lookup_u64(flavor, &["stats", "mentions_count"]).unwrap_or(0)));
    ranked
        .into_iter()
        .take(FLAVOR_RANKS)
        .map(|flavor| lookup_str(flavor, &["group"]))
        .collect()
}

/// Fill the seven taste fields from a tastes payload.
///
/// Returns `false` and clears the fields when the payload has no `tastes` object.
pub fn apply_tastes(record: &mut WineRecord, payload: &Value) -> bool {
    let Some(tastes) = lookup(payload, &["tastes"]).filter(|t| t.is_object()) else {
        record.clear_taste_profile();
        return false;
    };

    record.acidity = lookup_f64(tastes, &["structure", "acidity"]);
    record.intensity = lookup_f64(tastes, &["structure", "intensity"]);
    record.sweetness = lookup_f64(tastes, &["structure", "sweetness"]);
    record.tannin = lookup_f64(tastes, &["structure", "tannin"]);

    let ranks = lookup_array(tastes, &["flavor"])
        .map(|flavors| rank_flavor_groups(flavors))
        .unwrap_or_default();
    record.set_flavor_ranks(ranks);
    true
}

/// Number of entries in a reviews payload, `None` when it has no `reviews` list.
pub fn count_reviews(payload: &Value) -> Option<u64> {
    lookup_array(payload, &["reviews"]).map(|reviews| reviews.len() as u64)
}

/// Normalizes raw matches, fetching detail data through the API seam.
pub struct RecordNormalizer {
    api: Arc<dyn WineApi>,
}

impl RecordNormalizer {
    pub fn new(api: Arc<dyn WineApi>) -> Self {
        Self { api }
    }

    pub async fn normalize(&self, raw: &RawMatch, dumps: &mut DebugDumps) -> WineRecord {
        let mut record = build_record(raw);

        let Some(wine_id) = record.id else {
            debug!("Match without wine id, skipping detail requests");
            record.reviews_count = Some(0);
            return record;
        };

        match self.api.tastes(wine_id).await {
            Ok(payload) => {
                if apply_tastes(&mut record, &payload) {
                    dumps.offer(TASTES_LABEL, &payload);
                } else {
                    warn!("⚠️  Tastes payload for wine {} has no tastes block", wine_id);
                }
            }
            Err(e) => {
                warn!("⚠️  Tastes request failed for wine {}: {}", wine_id, e);
                record.clear_taste_profile();
            }
        }

        // Overwrites the statistics count from the search response.
        record.reviews_count = match self.api.reviews(wine_id).await {
            Ok(payload) => {
                let count = count_reviews(&payload);
                if count.is_some() {
                    dumps.offer(REVIEWS_LABEL, &payload);
                }
                Some(count.unwrap_or(0))
            }
            Err(e) => {
                warn!("⚠️  Reviews request failed for wine {}: {}", wine_id, e);
                Some(0)
            }
        };

        record
    }
}
