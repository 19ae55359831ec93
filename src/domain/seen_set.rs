//! Crawl-session memory of already observed matches.
//!
//! Used only to detect pages that repeat earlier content while paging; the
//! final `(id, vintage)` merge dedupe is a separate step (see `dedup`).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Identity used for repeat-page detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatKey {
    /// Wine id only: a new vintage of a known wine counts as already seen.
    #[default]
    Wine,
    /// `(wine id, vintage year)`: every vintage is a distinct identity.
    WineVintage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchKey {
    pub wine_id: u64,
    pub year: Option<i64>,
}

impl MatchKey {
    pub fn new(key: RepeatKey, wine_id: u64, year: Option<i64>) -> Self {
        match key {
            RepeatKey::Wine => Self { wine_id, year: None },
            RepeatKey::WineVintage => Self { wine_id, year },
        }
    }
}

#[derive(Debug, Default)]
pub struct SeenSet {
    keys: HashSet<MatchKey>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &MatchKey) -> bool {
        self.keys.contains(key)
    }

    /// Keys from `page` that have not been seen yet, in page order, without repeats.
    pub fn novel(&self, page: &[MatchKey]) -> Vec<MatchKey> {
        let mut fresh = Vec::new();
        let mut on_page = HashSet::new();
        for key in page {
            if !self.keys.contains(key) && on_page.insert(*key) {
                fresh.push(*key);
            }
        }
        fresh
    }

    /// Record keys; the set only ever grows.
    pub fn extend<I: IntoIterator<Item = MatchKey>>(&mut self, keys: I) {
        self.keys.extend(keys);
    }
}
