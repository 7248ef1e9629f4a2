//! Detection pipeline: tint classification, pattern matching, and the
//! request/response controller that ties them together.

pub mod controller;
pub mod pattern;
pub mod tint;

pub use controller::{DetectionController, Resolution, RetryPolicy};
pub use pattern::PatternMatcher;
pub use tint::TintCategory;

/// Terminal category of one detection request.
///
/// Invariants: `FoundShiny` and `FoundNormal` require a pattern match with
/// the corresponding tint; `FoundInvalid` is a pattern match whose tint is
/// neither; `NotFound` means the pattern never matched, whatever the tint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionOutcome {
    NotFound,
    FoundNormal,
    FoundShiny,
    FoundInvalid,
}

impl DetectionOutcome {
    /// Outcome for an attempt whose pattern matched, from that same
    /// attempt's tint. Tint and match are jointly captured per attempt and
    /// never reconciled across attempts.
    pub fn from_match(tint: TintCategory) -> Self {
        match tint {
            TintCategory::Greenish => DetectionOutcome::FoundNormal,
            TintCategory::Pinkish => DetectionOutcome::FoundShiny,
            TintCategory::Other => DetectionOutcome::FoundInvalid,
        }
    }

    pub fn combine(matched: bool, tint: TintCategory) -> Self {
        if matched {
            Self::from_match(tint)
        } else {
            DetectionOutcome::NotFound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_combination_table() {
        use DetectionOutcome::*;
        use TintCategory::*;

        assert_eq!(DetectionOutcome::combine(true, Greenish), FoundNormal);
        assert_eq!(DetectionOutcome::combine(true, Pinkish), FoundShiny);
        assert_eq!(DetectionOutcome::combine(true, Other), FoundInvalid);
        assert_eq!(DetectionOutcome::combine(false, Greenish), NotFound);
        assert_eq!(DetectionOutcome::combine(false, Pinkish), NotFound);
        assert_eq!(DetectionOutcome::combine(false, Other), NotFound);
    }
}
