//! Per-segment placement outcomes and the aggregate alignment report.
//!
//! The engine recovers every per-segment failure locally and never aborts a
//! composition because one segment misbehaves. The counts collected here are
//! its only externally visible error signal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Correction-aggressiveness bucket chosen from the duration-ratio deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempoTier {
    /// Deviation within the perfect tolerance; no correction.
    Perfect,
    /// Small mismatch; half of the needed correction is applied.
    Gentle,
    /// Moderate mismatch; 70% of the needed correction is applied.
    Moderate,
    /// Large mismatch; the full correction is applied, capped at the bounds.
    Aggressive,
}

/// Final placement outcome for one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentOutcome {
    /// Clip placed unmodified.
    AsIs,
    /// Clip placed after tempo correction.
    TempoAdjusted { factor: f64, tier: TempoTier },
    /// Corrected clip placed in full by borrowing adjacent silence.
    Borrowed {
        before_ms: f64,
        after_ms: f64,
        factor: f64,
    },
    /// Clip truncated to the target window.
    Truncated { trimmed_ms: f64 },
    /// Clip padded with trailing silence to the target window.
    Padded { padding_ms: f64 },
    /// No synthesized audio; the target window is rendered as silence.
    Silent,
}

impl SegmentOutcome {
    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AsIs => "as_is",
            Self::TempoAdjusted { .. } => "tempo_adjusted",
            Self::Borrowed { .. } => "borrowed",
            Self::Truncated { .. } => "truncated",
            Self::Padded { .. } => "padded",
            Self::Silent => "silent",
        }
    }
}

/// A failure recovered during segment processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveredFailure {
    /// The tempo primitive or its filter chain failed; the original clip
    /// was placed instead.
    TempoAdjustment,
    /// Reassembling the adjusted audio failed; the original clip was
    /// placed instead.
    Concatenation,
}

/// Aggregate placement statistics for one alignment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub total_segments: usize,
    pub placed_as_is: usize,
    pub tempo_adjusted: usize,
    pub borrowed: usize,
    pub truncated: usize,
    pub padded: usize,
    pub silent: usize,
    pub recovered_failures: usize,
    /// Duration of the composed master track in milliseconds.
    pub output_duration_ms: f64,
    pub finished_at: DateTime<Utc>,
}

impl AlignmentReport {
    pub fn new() -> Self {
        Self {
            total_segments: 0,
            placed_as_is: 0,
            tempo_adjusted: 0,
            borrowed: 0,
            truncated: 0,
            padded: 0,
            silent: 0,
            recovered_failures: 0,
            output_duration_ms: 0.0,
            finished_at: Utc::now(),
        }
    }

    /// Count one segment's outcome.
    pub fn record(&mut self, outcome: &SegmentOutcome) {
        self.total_segments += 1;
        match outcome {
            SegmentOutcome::AsIs => self.placed_as_is += 1,
            SegmentOutcome::TempoAdjusted { .. } => self.tempo_adjusted += 1,
            SegmentOutcome::Borrowed { .. } => self.borrowed += 1,
            SegmentOutcome::Truncated { .. } => self.truncated += 1,
            SegmentOutcome::Padded { .. } => self.padded += 1,
            SegmentOutcome::Silent => self.silent += 1,
        }
    }

    /// Count a locally recovered failure.
    pub fn record_recovered(&mut self) {
        self.recovered_failures += 1;
    }

    /// Stamp the final output duration and completion time.
    pub fn complete(&mut self, output_duration_ms: f64) {
        self.output_duration_ms = output_duration_ms;
        self.finished_at = Utc::now();
    }

    /// Number of segments that carried audio.
    pub fn voiced_segments(&self) -> usize {
        self.total_segments - self.silent
    }
}

impl Default for AlignmentReport {
    fn default() -> Self {
        Self::new()
    }
}
