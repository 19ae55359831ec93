//! Split-or-page decision for one price range
//!
//! The search API only paginates through the first `cap` matches of a
//! filter combination. Ranges at or above the cap are halved until each
//! piece fits, or until the range is too narrow to split further.

use crate::domain::search_range::SearchRange;
use crate::infrastructure::config::CrawlerConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SplitDecision {
    /// Recurse into both halves, left first
    Split(SearchRange, SearchRange),
    /// Page through the range directly
    Leaf { page_count: u32 },
}

#[derive(Debug, Clone)]
pub struct RangeSplitter {
    cap: u64,
    min_width: f64,
    records_per_page: u32,
}

impl RangeSplitter {
    pub fn new(cap: u64, min_width: f64, records_per_page: u32) -> Self {
        Self {
            cap,
            min_width,
            records_per_page: records_per_page.max(1),
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.result_window_cap, config.min_range_width, config.records_per_page)
    }

    /// Pages walked for a leaf with `matched` results: `max(1, matched / per_page) + 1`.
    ///
    /// The extra page absorbs a trailing partial page; an empty page ends the walk early.
    pub fn page_count(&self, matched: u64) -> u32 {
        let full_pages = (matched / u64::from(self.records_per_page)).max(1);
        u32::try_from(full_pages + 1).unwrap_or(u32::MAX)
    }

    pub fn decide(&self, range: SearchRange, matched: u64) -> SplitDecision {
        if matched >= self.cap && range.can_split(self.min_width) {
            if let Some((left, right)) = range.halves() {
                return SplitDecision::Split(left, right);
            }
        }
        SplitDecision::Leaf {
            page_count: self.page_count(matched),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn splitter() -> RangeSplitter {
        RangeSplitter::new(2000, 0.02, 25)
    }

    #[rstest]
    #[case(0, 2)]
    #[case(10, 2)]
    #[case(25, 2)]
    #[case(49, 2)]
    #[case(50, 3)]
    #[case(1999, 80)]
    #[case(2000, 81)]
    fn test_page_count(#[case] matched: u64, #[case] expected: u32) {
        assert_eq!(splitter().page_count(matched), expected);
    }

    #[rstest]
    #[case(0.0, 100.0, 1999, false)]
    #[case(0.0, 100.0, 2000, true)]
    #[case(0.0, 100.0, 90_000, true)]
    #[case(10.0, 10.02, 5000, false)]
    #[case(10.0, 10.01, 5000, false)]
    #[case(10.0, 10.05, 5000, true)]
    fn test_split_decision(#[case] min: f64, #[case] max: f64, #[case] matched: u64, #[case] splits: bool) {
        let range = SearchRange::new(min, max).unwrap();
        let decision = splitter().decide(range, matched);
        assert_eq!(matches!(decision, SplitDecision::Split(..)), splits, "{:?}", decision);
    }

    #[test]
    fn test_narrow_range_over_cap_becomes_leaf() {
        let range = SearchRange::new(9.99, 10.0).unwrap();
        assert_eq!(splitter().decide(range, 12_000), SplitDecision::Leaf { page_count: 481 });
    }

    #[test]
    fn test_split_halves_at_midpoint() {
        let range = SearchRange::new(0.0, 50_000.0).unwrap();
        match splitter().decide(range, 100_000) {
            SplitDecision::Split(left, right) => {
                assert_eq!(left, SearchRange::new(0.0, 25_000.0).unwrap());
                assert_eq!(right, SearchRange::new(25_000.0, 50_000.0).unwrap());
            }
            other => panic!("expected split, got {:?}", other),
        }
    }

    proptest! {
        #[test]
        fn split_halves_partition_the_range(min in -1.0e6f64..1.0e6, width in 0.03f64..1.0e6, price in -2.0e6f64..2.0e6) {
            let range = SearchRange::new(min, min + width).unwrap();
            if let SplitDecision::Split(left, right) = splitter().decide(range, 2000) {
                prop_assert_eq!(left.min, range.min);
                prop_assert_eq!(left.max, right.min);
                prop_assert_eq!(right.max, range.max);
                // every price lands in exactly one half iff it is in the range
                let hits = left.contains(price) as u8 + right.contains(price) as u8;
                prop_assert_eq!(hits, range.contains(price) as u8);
            } else {
                prop_assert!(false, "range of width {} was not split", width);
            }
        }
    }
}
