//! Alignment engine configuration.

use serde::{Deserialize, Serialize};

use crate::buffer::DEFAULT_SAMPLE_RATE;
use crate::tempo::TempoConfig;

/// Placement strategy for the master track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementMode {
    /// Pre-allocate a silent track sized to the last segment's end and
    /// additively overlay each clip at its original offset. Total duration
    /// is known upfront; segments are corrected independently without
    /// disturbing already-placed neighbors.
    Overlay,
    /// Build the track incrementally, appending explicit silence to cover
    /// the gap up to each segment's start before appending its clip.
    Append,
}

/// Configuration for one alignment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentConfig {
    /// Tempo correction tunables.
    pub tempo: TempoConfig,

    /// Placement strategy.
    pub mode: PlacementMode,

    /// Master track sample rate.
    pub sample_rate: u32,

    /// Fraction of an overhang the borrowed silence must cover for the
    /// borrow to be accepted.
    pub borrow_acceptance: f64,

    /// Practical cap applied to the unbounded trailing gap before the
    /// half-gap borrowing rule.
    pub max_borrowable_gap_ms: f64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            tempo: TempoConfig::default(),
            mode: PlacementMode::Append,
            sample_rate: DEFAULT_SAMPLE_RATE,
            borrow_acceptance: 0.8,
            max_borrowable_gap_ms: 10_000.0,
        }
    }
}

impl AlignmentConfig {
    /// Builder-style setter for the placement mode.
    pub fn with_mode(mut self, mode: PlacementMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder-style setter for the tempo tunables.
    pub fn with_tempo(mut self, tempo: TempoConfig) -> Self {
        self.tempo = tempo;
        self
    }

    /// Builder-style setter for the sample rate.
    pub fn with_sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = rate;
        self
    }
}
