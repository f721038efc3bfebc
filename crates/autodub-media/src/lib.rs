#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper and audio timeline reconciliation engine.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with timeout and cancellation
//! - Audio probing via ffprobe
//! - In-memory mono PCM clips with WAV round-trip
//! - Tiered tempo correction with atempo filter chaining
//! - The timeline reconciliation engine (analyze, borrow, compose)
//! - Vocal/background separation and final mix/mux operations

pub mod align;
pub mod buffer;
pub mod command;
pub mod error;
pub mod mux;
pub mod probe;
pub mod separate;
pub mod tempo;

// Re-export common types
pub use align::{
    align_segments, AlignmentConfig, AlignmentOutput, PlacedSegment, PlacementMode,
    SynthesizedSegment,
};
pub use buffer::{AudioClip, DEFAULT_SAMPLE_RATE};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use mux::{extract_audio, mix_with_background, mux_video, MixConfig};
pub use probe::{get_duration_ms, probe_audio, AudioInfo};
pub use separate::{separate_audio, SeparatedAudio, SeparationConfig};
pub use tempo::{FfmpegTempoShifter, TempoConfig, TempoPlan, TempoShifter};
