//! Mapping duration ratios to tempo factors.
//!
//! Applying 100% of the theoretically required correction on every mismatch
//! produces unnatural pacing for small deviations, so smaller deviations
//! receive proportionally gentler treatment. Residual mismatch left by a
//! partial correction is absorbed downstream by gap borrowing or, failing
//! that, truncation/padding against the target window.

use autodub_models::TempoTier;

use super::config::TempoConfig;

/// Fraction of the needed correction applied in the gentle tier.
const GENTLE_CORRECTION: f64 = 0.5;

/// Fraction of the needed correction applied in the moderate tier.
const MODERATE_CORRECTION: f64 = 0.7;

/// A chosen correction for one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoPlan {
    pub tier: TempoTier,
    /// Tempo multiplier handed to the primitive; the emitted duration is
    /// approximately `original / factor`.
    pub factor: f64,
}

impl TempoPlan {
    /// Whether this plan changes the audio at all.
    pub fn is_correction(&self) -> bool {
        self.factor != 1.0
    }
}

/// Choose a correction tier and factor for a duration ratio.
///
/// The committed factor always lies within the configured bounds; the
/// deviation tiers decide how much of the ideal correction is applied.
pub fn plan_correction(duration_ratio: f64, config: &TempoConfig) -> TempoPlan {
    let deviation = (1.0 - duration_ratio).abs();
    let ideal_factor = 1.0 / duration_ratio;
    let clamp = |factor: f64| factor.clamp(config.min_factor, config.max_factor);

    if deviation <= config.perfect_threshold {
        TempoPlan {
            tier: TempoTier::Perfect,
            factor: 1.0,
        }
    } else if deviation <= config.gentle_threshold {
        TempoPlan {
            tier: TempoTier::Gentle,
            factor: clamp(1.0 + (ideal_factor - 1.0) * GENTLE_CORRECTION),
        }
    } else if deviation <= config.moderate_threshold {
        TempoPlan {
            tier: TempoTier::Moderate,
            factor: clamp(1.0 + (ideal_factor - 1.0) * MODERATE_CORRECTION),
        }
    } else {
        TempoPlan {
            tier: TempoTier::Aggressive,
            factor: clamp(ideal_factor),
        }
    }
}
