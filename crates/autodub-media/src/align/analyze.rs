//! Per-segment timing analysis.
//!
//! Pure computation: no side effects, no external calls. Each segment with
//! a present clip gets a [`TimingRecord`] describing how far its synthesized
//! duration is from the original utterance window and how much idle silence
//! sits on either side.

use super::SynthesizedSegment;

/// Timing requirements for one segment carrying audio.
#[derive(Debug, Clone)]
pub struct TimingRecord {
    /// Index in the input segment list.
    pub index: usize,
    /// Window start on the original timeline, milliseconds.
    pub start_ms: f64,
    /// Original utterance window duration, milliseconds.
    pub target_duration_ms: f64,
    /// Synthesized clip duration, milliseconds.
    pub actual_duration_ms: f64,
    /// `actual / target`.
    pub duration_ratio: f64,
    /// Idle gap to the previous segment's end; 0 for the first segment.
    pub silence_before_ms: f64,
    /// Idle gap to the next segment's start; unbounded for the last.
    pub silence_after_ms: f64,
    /// Whether the deviation exceeds the perfect tolerance.
    pub needs_adjustment: bool,
}

/// Compute timing records for every segment carrying audio.
///
/// Neighbor gaps come from the raw segment boundaries, not from anything
/// already placed; this keeps the records independent of each other so they
/// could be computed concurrently before the sequential composition pass.
/// Segments without audio yield `None` and are rendered as silence
/// downstream.
pub fn analyze_timing(
    segments: &[SynthesizedSegment],
    perfect_threshold: f64,
) -> Vec<Option<TimingRecord>> {
    segments
        .iter()
        .enumerate()
        .map(|(index, synth)| {
            let clip = synth.clip.as_ref()?;

            let start_ms = synth.segment.start_ms();
            let end_ms = synth.segment.end_ms();
            let target_duration_ms = end_ms - start_ms;
            let actual_duration_ms = clip.duration_ms();
            let duration_ratio = actual_duration_ms / target_duration_ms;

            let silence_before_ms = if index == 0 {
                0.0
            } else {
                (start_ms - segments[index - 1].segment.end_ms()).max(0.0)
            };
            let silence_after_ms = match segments.get(index + 1) {
                Some(next) => (next.segment.start_ms() - end_ms).max(0.0),
                None => f64::INFINITY,
            };

            Some(TimingRecord {
                index,
                start_ms,
                target_duration_ms,
                actual_duration_ms,
                duration_ratio,
                silence_before_ms,
                silence_after_ms,
                needs_adjustment: (1.0 - duration_ratio).abs() > perfect_threshold,
            })
        })
        .collect()
}
