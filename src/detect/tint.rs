//! Tint classification of a sampled region's mean color.

use crate::frame::MeanColor;

/// Margin by which one channel must exceed the other before a tint is
/// declared. Strict inequality: a difference of exactly this value is
/// `Other`.
pub const TINT_MARGIN: f32 = 10.0;

/// Discrete color classification of the detection region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TintCategory {
    Greenish,
    Pinkish,
    #[default]
    Other,
}

impl TintCategory {
    /// Deterministic, pure. Retries on ambiguous samples belong to the
    /// controller, not here.
    pub fn classify(mean: MeanColor) -> Self {
        if mean.g > mean.r + TINT_MARGIN {
            TintCategory::Greenish
        } else if mean.r > mean.g + TINT_MARGIN {
            TintCategory::Pinkish
        } else {
            TintCategory::Other
        }
    }
}

impl std::fmt::Display for TintCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TintCategory::Greenish => "greenish",
            TintCategory::Pinkish => "pinkish",
            TintCategory::Other => "other",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean(b: f32, g: f32, r: f32) -> MeanColor {
        MeanColor { b, g, r }
    }

    #[test]
    fn green_dominant_is_greenish() {
        assert_eq!(
            TintCategory::classify(mean(50.0, 200.0, 40.0)),
            TintCategory::Greenish
        );
    }

    #[test]
    fn red_dominant_is_pinkish() {
        assert_eq!(
            TintCategory::classify(mean(50.0, 40.0, 200.0)),
            TintCategory::Pinkish
        );
    }

    #[test]
    fn margin_is_a_strict_inequality() {
        // Exactly 10 apart in either direction stays Other.
        assert_eq!(
            TintCategory::classify(mean(0.0, 110.0, 100.0)),
            TintCategory::Other
        );
        assert_eq!(
            TintCategory::classify(mean(0.0, 100.0, 110.0)),
            TintCategory::Other
        );
        assert_eq!(
            TintCategory::classify(mean(0.0, 100.1, 110.0)),
            TintCategory::Other
        );
    }

    #[test]
    fn just_past_the_margin_flips() {
        assert_eq!(
            TintCategory::classify(mean(0.0, 110.5, 100.0)),
            TintCategory::Greenish
        );
        assert_eq!(
            TintCategory::classify(mean(0.0, 100.0, 110.5)),
            TintCategory::Pinkish
        );
    }
}
