//! Speech segments handed over by the synthesis collaborator.
//!
//! A manifest is an ordered list of utterances on the original timeline,
//! each pointing at its synthesized audio clip (or marked as failed
//! synthesis). The reconciliation engine consumes segments exactly as they
//! arrive; it does not re-sort them.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::timestamp::{parse_timestamp, MAX_TIMELINE_SECS};

/// A single utterance on the original timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechSegment {
    /// Start time in seconds on the original timeline.
    #[serde(deserialize_with = "seconds_or_clock")]
    pub start: f64,
    /// End time in seconds on the original timeline.
    #[serde(deserialize_with = "seconds_or_clock")]
    pub end: f64,
    /// Speaker label from diarization (e.g. "SPEAKER_00").
    #[serde(default)]
    pub speaker: String,
    /// Translated text; informational only to the engine.
    #[serde(default)]
    pub text: String,
    /// Path to the synthesized clip. `None` marks failed synthesis; the
    /// segment is rendered as silence of its target duration.
    #[serde(default)]
    pub audio: Option<PathBuf>,
}

impl SpeechSegment {
    /// Start position in milliseconds.
    pub fn start_ms(&self) -> f64 {
        self.start * 1000.0
    }

    /// End position in milliseconds.
    pub fn end_ms(&self) -> f64 {
        self.end * 1000.0
    }

    /// Duration of the original utterance window in milliseconds.
    pub fn target_duration_ms(&self) -> f64 {
        (self.end - self.start) * 1000.0
    }

    /// Whether synthesis produced a clip for this segment.
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /// Validate a single segment's boundaries.
    pub fn validate(&self) -> Result<(), SegmentError> {
        if self.start < 0.0 || self.end < 0.0 {
            return Err(SegmentError::NegativeBoundary {
                start: self.start,
                end: self.end,
            });
        }
        if self.start >= self.end {
            return Err(SegmentError::StartNotBeforeEnd {
                start: self.start,
                end: self.end,
            });
        }
        if self.end > MAX_TIMELINE_SECS {
            return Err(SegmentError::ExceedsMaxDuration(self.end));
        }
        Ok(())
    }
}

/// Accept either a JSON number of seconds or a clock string like "01:02:03.500".
fn seconds_or_clock<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(f64),
        Clock(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Seconds(s) => Ok(s),
        Raw::Clock(s) => parse_timestamp(&s).map_err(serde::de::Error::custom),
    }
}

/// Validate an ordered segment manifest.
///
/// Checks the engine's input contract: non-empty, every segment has valid
/// boundaries, and segments are sorted ascending by start.
pub fn validate_manifest(segments: &[SpeechSegment]) -> Result<(), SegmentError> {
    if segments.is_empty() {
        return Err(SegmentError::Empty);
    }
    for (index, segment) in segments.iter().enumerate() {
        segment
            .validate()
            .map_err(|source| SegmentError::InvalidSegment {
                index,
                source: Box::new(source),
            })?;
    }
    for (index, pair) in segments.windows(2).enumerate() {
        if pair[1].start < pair[0].start {
            return Err(SegmentError::OutOfOrder { index: index + 1 });
        }
    }
    Ok(())
}

/// Segment validation error.
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("Segment manifest is empty")]
    Empty,

    #[error("Segment boundaries cannot be negative (start={start}, end={end})")]
    NegativeBoundary { start: f64, end: f64 },

    #[error("Segment start must be before end (start={start}, end={end})")]
    StartNotBeforeEnd { start: f64, end: f64 },

    #[error("Segment end ({0}s) exceeds maximum timeline duration")]
    ExceedsMaxDuration(f64),

    #[error("Segment {index} is invalid: {source}")]
    InvalidSegment {
        index: usize,
        source: Box<SegmentError>,
    },

    #[error("Segment {index} starts before its predecessor; manifest must be sorted by start")]
    OutOfOrder { index: usize },
}
