//! Price intervals over the search filter dimension.
//!
//! A `SearchRange` is half-open: `[min, max)`. Halving at the midpoint yields
//! `[min, mid)` and `[mid, max)`, so repeated splitting always partitions the
//! original interval with no gaps and no shared boundary values.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchRange {
    pub min: f64,
    pub max: f64,
}

impl SearchRange {
    /// Create a range, returning `None` unless `min < max` and both bounds are finite.
    pub fn new(min: f64, max: f64) -> Option<Self> {
        if min.is_finite() && max.is_finite() && min < max {
            Some(Self { min, max })
        } else {
            None
        }
    }

    /// The full search domain `[0, price_max)`.
    pub fn full(price_max: f64) -> Option<Self> {
        Self::new(0.0, price_max)
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn midpoint(&self) -> f64 {
        self.min + self.width() / 2.0
    }

    /// Whether the range is wide enough to be halved again.
    pub fn can_split(&self, min_width: f64) -> bool {
        self.width() > min_width
    }

    /// Split at the midpoint into `(left, right)`.
    ///
    /// Returns `None` when the midpoint collapses onto a bound, which only
    /// happens once the width is below floating point resolution.
    pub fn halves(&self) -> Option<(Self, Self)> {
        let mid = self.midpoint();
        let left = Self::new(self.min, mid)?;
        let right = Self::new(mid, self.max)?;
        Some((left, right))
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price < self.max
    }
}

impl fmt::Display for SearchRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.2}, {:.2})", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_rejects_empty_and_inverted_ranges() {
        assert!(SearchRange::new(10.0, 10.0).is_none());
        assert!(SearchRange::new(10.0, 5.0).is_none());
        assert!(SearchRange::new(0.0, f64::INFINITY).is_none());
        assert!(SearchRange::new(0.0, 1.0).is_some());
    }

    #[test]
    fn test_halves_share_only_the_midpoint_boundary() {
        let range = SearchRange::new(0.0, 100.0).unwrap();
        let (left, right) = range.halves().unwrap();

        assert_eq!(left.min, 0.0);
        assert_eq!(left.max, 50.0);
        assert_eq!(right.min, 50.0);
        assert_eq!(right.max, 100.0);

        // half-open: the midpoint belongs to the right half only
        assert!(!left.contains(50.0));
        assert!(right.contains(50.0));
        assert!(left.contains(0.0));
        assert!(!right.contains(100.0));
    }

    #[rstest]
    #[case(0.0, 0.02, false)]
    #[case(0.0, 0.021, true)]
    #[case(10.0, 10.01, false)]
    #[case(0.0, 50000.0, true)]
    fn test_can_split_respects_granularity(#[case] min: f64, #[case] max: f64, #[case] expected: bool) {
        let range = SearchRange::new(min, max).unwrap();
        assert_eq!(range.can_split(0.02), expected);
    }

    #[test]
    fn test_display_uses_currency_precision() {
        let range = SearchRange::new(12.5, 25.0).unwrap();
        assert_eq!(range.to_string(), "[12.50, 25.00)");
    }
}
