//! Tiered tempo correction for synthesized clips.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ duration     │───►│ Policy       │───►│ Filter chain │
//! │ ratio        │    │ (tier+factor)│    │ (atempo ...) │
//! └──────────────┘    └──────────────┘    └──────┬───────┘
//!                                                │
//!                                                ▼
//!                                         ┌──────────────┐
//!                                         │ TempoShifter │
//!                                         │ (FFmpeg CLI) │
//!                                         └──────────────┘
//! ```
//!
//! The policy picks how much correction a mismatch deserves; the chain
//! splits factors the primitive cannot take in one stage; the shifter runs
//! the chain. A failed shift is recovered by the caller with the original,
//! unmodified clip.

mod apply;
mod chain;
mod config;
mod policy;

pub use apply::{FfmpegTempoShifter, TempoShifter};
pub use chain::{atempo_filter, decompose_factor, ATEMPO_MAX, ATEMPO_MIN};
pub use config::TempoConfig;
pub use policy::{plan_correction, TempoPlan};
