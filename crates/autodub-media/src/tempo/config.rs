//! Tempo correction tunables.
//!
//! These parameters control how aggressively duration mismatches are
//! corrected. An explicit config value is passed into the policy so runs
//! with different tuning can execute concurrently without interference.

use serde::{Deserialize, Serialize};

/// Tuning constants for tiered tempo correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TempoConfig {
    /// Deviation at or below this is left uncorrected.
    ///
    /// - Lower values (0.02): chase tiny mismatches, more FFmpeg calls
    /// - Default (0.05): ±5% timing difference passes through untouched
    /// - Higher values (0.10+): accept visibly loose timing
    pub perfect_threshold: f64,

    /// Deviation at or below this receives half of the needed correction.
    ///
    /// Small mismatches corrected fully sound paced-for-the-clock; applying
    /// 50% keeps speech natural and lets borrowing absorb the rest.
    pub gentle_threshold: f64,

    /// Deviation at or below this receives 70% of the needed correction.
    pub moderate_threshold: f64,

    /// Committed factors never drop below this (slowest stretch).
    ///
    /// - Default (0.7): at most 30% slower
    pub min_factor: f64,

    /// Committed factors never rise above this (fastest squeeze).
    ///
    /// - Default (1.4): at most 40% faster
    pub max_factor: f64,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            perfect_threshold: 0.05,
            gentle_threshold: 0.15,
            moderate_threshold: 0.30,
            min_factor: 0.7,
            max_factor: 1.4,
        }
    }
}

impl TempoConfig {
    /// Builder-style setter for the perfect threshold.
    pub fn with_perfect_threshold(mut self, threshold: f64) -> Self {
        self.perfect_threshold = threshold.max(0.0);
        self
    }

    /// Builder-style setter for the gentle threshold.
    pub fn with_gentle_threshold(mut self, threshold: f64) -> Self {
        self.gentle_threshold = threshold.max(0.0);
        self
    }

    /// Builder-style setter for the moderate threshold.
    pub fn with_moderate_threshold(mut self, threshold: f64) -> Self {
        self.moderate_threshold = threshold.max(0.0);
        self
    }

    /// Builder-style setter for the factor bounds.
    pub fn with_factor_bounds(mut self, min: f64, max: f64) -> Self {
        self.min_factor = min;
        self.max_factor = max;
        self
    }

    /// Check the thresholds are ordered and the bounds bracket unity.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.perfect_threshold < self.gentle_threshold
            && self.gentle_threshold < self.moderate_threshold)
        {
            return Err(format!(
                "thresholds must be strictly increasing: {} < {} < {}",
                self.perfect_threshold, self.gentle_threshold, self.moderate_threshold
            ));
        }
        if !(self.min_factor > 0.0 && self.min_factor <= 1.0 && self.max_factor >= 1.0) {
            return Err(format!(
                "factor bounds must bracket 1.0: [{}, {}]",
                self.min_factor, self.max_factor
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TempoConfig::default();
        assert!((config.perfect_threshold - 0.05).abs() < f64::EPSILON);
        assert!((config.gentle_threshold - 0.15).abs() < f64::EPSILON);
        assert!((config.moderate_threshold - 0.30).abs() < f64::EPSILON);
        assert!((config.min_factor - 0.7).abs() < f64::EPSILON);
        assert!((config.max_factor - 1.4).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = TempoConfig::default()
            .with_perfect_threshold(0.02)
            .with_factor_bounds(0.5, 2.0);

        assert!((config.perfect_threshold - 0.02).abs() < f64::EPSILON);
        assert!((config.min_factor - 0.5).abs() < f64::EPSILON);
        assert!((config.max_factor - 2.0).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unordered_thresholds() {
        let config = TempoConfig::default().with_gentle_threshold(0.4);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bounds_excluding_unity() {
        let config = TempoConfig::default().with_factor_bounds(1.1, 1.4);
        assert!(config.validate().is_err());
    }
}
