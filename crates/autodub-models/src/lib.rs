//! Shared data models for the autodub pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Speech segments handed over by the synthesis collaborator
//! - Timestamp parsing and validation
//! - Per-segment placement outcomes and the aggregate alignment report

pub mod report;
pub mod segment;
pub mod timestamp;

// Re-export common types
pub use report::{AlignmentReport, RecoveredFailure, SegmentOutcome, TempoTier};
pub use segment::{validate_manifest, SegmentError, SpeechSegment};
pub use timestamp::{format_seconds, parse_timestamp, TimestampError};
