//! Per-leaf repeat-page state machine.
//!
//! ```text
//! Active ──all seen──▶ Duplicate(1) ──all seen──▶ ... ──▶ Terminated (n == threshold)
//!   ▲                      │
//!   └──── novel key ───────┘
//! ```

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RepeatState {
    #[default]
    Active,
    /// `n` consecutive pages without a novel key
    Duplicate(u32),
    Terminated,
}

impl RepeatState {
    /// Transition for a non-empty page whose keys were all seen before.
    pub fn on_repeat(self, threshold: u32) -> Self {
        let next = match self {
            Self::Active => 1,
            Self::Duplicate(n) => n.saturating_add(1),
            Self::Terminated => return Self::Terminated,
        };
        if next >= threshold {
            Self::Terminated
        } else {
            Self::Duplicate(next)
        }
    }

    /// Transition for a page carrying at least one novel key.
    pub fn on_novel(self) -> Self {
        match self {
            Self::Terminated => Self::Terminated,
            _ => Self::Active,
        }
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated)
    }

    pub fn consecutive_duplicates(&self) -> u32 {
        match self {
            Self::Active => 0,
            Self::Duplicate(n) => *n,
            Self::Terminated => u32::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminates_on_fifth_consecutive_repeat() {
        let mut state = RepeatState::Active;
        for n in 1..5 {
            state = state.on_repeat(5);
            assert_eq!(state, RepeatState::Duplicate(n));
        }
        state = state.on_repeat(5);
        assert!(state.is_terminated());
    }

    #[test]
    fn test_novel_page_resets_counter() {
        let state = RepeatState::Active.on_repeat(5).on_repeat(5).on_repeat(5);
        assert_eq!(state.consecutive_duplicates(), 3);

        let state = state.on_novel();
        assert_eq!(state, RepeatState::Active);
        assert_eq!(state.on_repeat(5), RepeatState::Duplicate(1));
    }

    #[test]
    fn test_terminated_is_absorbing() {
        let state = RepeatState::Terminated;
        assert!(state.on_novel().is_terminated());
        assert!(state.on_repeat(5).is_terminated());
    }

    #[test]
    fn test_threshold_of_one_terminates_immediately() {
        assert!(RepeatState::Active.on_repeat(1).is_terminated());
    }
}
