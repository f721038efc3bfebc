//! Audio timeline reconciliation.
//!
//! Places synthesized speech clips onto a single master track so that no
//! clip overlaps its neighbor, clips stay close to their original start
//! times, and duration mismatches are resolved through bounded tempo
//! correction rather than hard truncation wherever avoidable.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ Segments     │───►│ Timing       │───►│ Tempo policy │
//! │ (ordered)    │    │ analysis     │    │ + shifter    │
//! └──────────────┘    └──────────────┘    └──────┬───────┘
//!                                                │
//!                                                ▼
//!                     ┌──────────────┐    ┌──────────────┐
//!                     │ Master track │◄───│ Gap borrower │
//!                     │ (compositor) │    │ / fallbacks  │
//!                     └──────────────┘    └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use autodub_media::align::{align_segments, AlignmentConfig, SynthesizedSegment};
//! use autodub_media::tempo::FfmpegTempoShifter;
//!
//! let synth: Vec<SynthesizedSegment> =
//!     segments.into_iter().map(SynthesizedSegment::load).collect();
//! let output = align_segments(&synth, &AlignmentConfig::default(),
//!     &FfmpegTempoShifter::new()).await?;
//! output.track.to_wav_file("dubbed_vocals.wav")?;
//! ```
//!
//! Every per-segment failure is recovered locally; the aggregate counts in
//! the returned report are the engine's only error signal. Only an empty
//! segment list fails the call itself.

mod analyze;
mod borrow;
mod compose;
mod config;

pub use analyze::{analyze_timing, TimingRecord};
pub use borrow::{plan_borrow, BorrowPlan};
pub use compose::TargetWindow;
pub use config::{AlignmentConfig, PlacementMode};

use tracing::{debug, info, warn};

use autodub_models::{AlignmentReport, RecoveredFailure, SegmentOutcome, SpeechSegment};

use crate::buffer::AudioClip;
use crate::error::{MediaError, MediaResult};
use crate::tempo::{plan_correction, TempoShifter};

use compose::{AppendTimeline, OverlayTimeline, Placement};

/// A segment paired with its decoded clip, ready for placement.
#[derive(Debug, Clone)]
pub struct SynthesizedSegment {
    pub segment: SpeechSegment,
    /// Decoded clip; `None` marks failed synthesis, rendered as silence.
    pub clip: Option<AudioClip>,
}

impl SynthesizedSegment {
    pub fn new(segment: SpeechSegment, clip: Option<AudioClip>) -> Self {
        Self { segment, clip }
    }

    /// Decode the segment's clip from its manifest path.
    ///
    /// A missing or unreadable file degrades to a silent segment rather
    /// than failing the run.
    pub fn load(segment: SpeechSegment) -> Self {
        let clip = match &segment.audio {
            Some(path) => match AudioClip::from_wav_file(path) {
                Ok(clip) => Some(clip),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read synthesized clip; rendering segment as silence"
                    );
                    None
                }
            },
            None => None,
        };
        Self { segment, clip }
    }
}

/// Placement result for one segment.
#[derive(Debug, Clone)]
pub struct PlacedSegment {
    /// Index in the input segment list.
    pub index: usize,
    pub outcome: SegmentOutcome,
    /// Failure recovered while producing the outcome, if any.
    pub recovered: Option<RecoveredFailure>,
}

/// Output of one alignment run.
#[derive(Debug)]
pub struct AlignmentOutput {
    /// The composed master track.
    pub track: AudioClip,
    /// Per-segment outcomes, in input order.
    pub placed: Vec<PlacedSegment>,
    pub report: AlignmentReport,
}

/// Place all segments onto one master track.
///
/// Segments must be ordered ascending by start; processing is strictly
/// sequential because the compositor's cursor and the borrow bookkeeping
/// are order-dependent. An empty list is the only hard failure.
pub async fn align_segments(
    segments: &[SynthesizedSegment],
    config: &AlignmentConfig,
    shifter: &dyn TempoShifter,
) -> MediaResult<AlignmentOutput> {
    let Some(last) = segments.last() else {
        return Err(MediaError::EmptyTimeline);
    };

    let mut timeline: Box<dyn Placement> = match config.mode {
        PlacementMode::Overlay => Box::new(OverlayTimeline::new(
            last.segment.end_ms(),
            config.sample_rate,
        )),
        PlacementMode::Append => Box::new(AppendTimeline::new(config.sample_rate)),
    };

    let records = analyze_timing(segments, config.tempo.perfect_threshold);

    let mut report = AlignmentReport::new();
    let mut placed = Vec::with_capacity(segments.len());

    for (index, (synth, record)) in segments.iter().zip(&records).enumerate() {
        let window = TargetWindow {
            start_ms: synth.segment.start_ms(),
            duration_ms: synth.segment.target_duration_ms(),
        };

        let (outcome, recovered) = match (&synth.clip, record) {
            (Some(clip), Some(record)) => {
                place_clip(timeline.as_mut(), clip, record, window, config, shifter).await
            }
            _ => {
                timeline.place_silence(window);
                (SegmentOutcome::Silent, None)
            }
        };

        debug!(
            segment = index,
            speaker = %synth.segment.speaker,
            outcome = outcome.label(),
            "Placed segment"
        );
        metrics::counter!("autodub_segments_total", "outcome" => outcome.label()).increment(1);

        report.record(&outcome);
        if recovered.is_some() {
            report.record_recovered();
        }
        placed.push(PlacedSegment {
            index,
            outcome,
            recovered,
        });
    }

    let track = timeline.finish();
    report.complete(track.duration_ms());

    info!(
        segments = report.total_segments,
        as_is = report.placed_as_is,
        adjusted = report.tempo_adjusted,
        borrowed = report.borrowed,
        truncated = report.truncated,
        padded = report.padded,
        silent = report.silent,
        recovered = report.recovered_failures,
        duration_ms = report.output_duration_ms,
        "Alignment completed"
    );

    Ok(AlignmentOutput {
        track,
        placed,
        report,
    })
}

/// Correct and place one clip, recovering any primitive failure locally.
async fn place_clip(
    timeline: &mut dyn Placement,
    clip: &AudioClip,
    record: &TimingRecord,
    window: TargetWindow,
    config: &AlignmentConfig,
    shifter: &dyn TempoShifter,
) -> (SegmentOutcome, Option<RecoveredFailure>) {
    let plan = plan_correction(record.duration_ratio, &config.tempo);
    let mut recovered = None;

    // The adjusted buffer is scoped to this call; it is merged into the
    // track below and dropped on return.
    let (adjusted, factor) = if plan.is_correction() {
        match shifter.shift(clip, plan.factor).await {
            Ok(adjusted) => (adjusted, plan.factor),
            Err(e) => {
                warn!(
                    segment = record.index,
                    factor = plan.factor,
                    error = %e,
                    "Tempo adjustment failed; falling back to unmodified clip"
                );
                recovered = Some(match e {
                    MediaError::ConcatenationFailed(_) => RecoveredFailure::Concatenation,
                    _ => RecoveredFailure::TempoAdjustment,
                });
                (clip.clone(), 1.0)
            }
        }
    } else {
        (clip.clone(), 1.0)
    };

    let overhang_ms = adjusted.duration_ms() - window.duration_ms;
    let tolerance_ms = window.duration_ms * config.tempo.perfect_threshold;

    if overhang_ms > tolerance_ms {
        if let Some(borrow) = plan_borrow(overhang_ms, record, config) {
            timeline.place(&adjusted, window, Some(&borrow));
            return (
                SegmentOutcome::Borrowed {
                    before_ms: borrow.before_ms,
                    after_ms: borrow.after_ms,
                    factor,
                },
                recovered,
            );
        }

        // Borrow rejected: hard-truncate to the original target window
        let mut truncated = adjusted;
        truncated.truncate_ms(window.duration_ms);
        timeline.place(&truncated, window, None);
        return (
            SegmentOutcome::Truncated {
                trimmed_ms: overhang_ms,
            },
            recovered,
        );
    }

    if overhang_ms < -tolerance_ms {
        let mut padded = adjusted;
        padded.pad_to_ms(window.duration_ms);
        timeline.place(&padded, window, None);
        return (
            SegmentOutcome::Padded {
                padding_ms: -overhang_ms,
            },
            recovered,
        );
    }

    timeline.place(&adjusted, window, None);
    if factor != 1.0 {
        (
            SegmentOutcome::TempoAdjusted {
                factor,
                tier: plan.tier,
            },
            recovered,
        )
    } else {
        (SegmentOutcome::AsIs, recovered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const RATE: u32 = 44_100;

    /// Resamples by sample-index mapping so the emitted duration is
    /// `original / factor`, like the real primitive.
    struct StubShifter {
        calls: AtomicUsize,
    }

    impl StubShifter {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TempoShifter for StubShifter {
        async fn shift(&self, clip: &AudioClip, factor: f64) -> MediaResult<AudioClip> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let src = clip.samples();
            let target_len = (src.len() as f64 / factor).round() as usize;
            let samples = (0..target_len)
                .map(|i| {
                    let j = (i as f64 * factor) as usize;
                    src.get(j).copied().unwrap_or(0.0)
                })
                .collect();
            Ok(AudioClip::new(samples, clip.sample_rate()))
        }
    }

    struct FailingShifter;

    #[async_trait]
    impl TempoShifter for FailingShifter {
        async fn shift(&self, _clip: &AudioClip, factor: f64) -> MediaResult<AudioClip> {
            Err(MediaError::tempo_failed(factor, "stub failure"))
        }
    }

    fn tone(duration_ms: f64) -> AudioClip {
        let len = ((duration_ms / 1000.0) * RATE as f64).round() as usize;
        AudioClip::new(vec![0.5; len], RATE)
    }

    fn synth(start: f64, end: f64, clip_ms: Option<f64>) -> SynthesizedSegment {
        SynthesizedSegment::new(
            SpeechSegment {
                start,
                end,
                speaker: "SPEAKER_00".to_string(),
                text: String::new(),
                audio: None,
            },
            clip_ms.map(tone),
        )
    }

    fn append_config() -> AlignmentConfig {
        AlignmentConfig::default()
    }

    fn overlay_config() -> AlignmentConfig {
        AlignmentConfig::default().with_mode(PlacementMode::Overlay)
    }

    #[tokio::test]
    async fn test_empty_segment_list_is_a_precondition_failure() {
        let result = align_segments(&[], &append_config(), &StubShifter::new()).await;
        assert!(matches!(result, Err(MediaError::EmptyTimeline)));
    }

    #[tokio::test]
    async fn test_overlay_track_length_equals_last_end() {
        let segments = vec![
            synth(0.5, 1.5, Some(1000.0)),
            synth(2.0, 4.0, Some(2000.0)),
            synth(5.0, 6.25, Some(1250.0)),
        ];
        let output = align_segments(&segments, &overlay_config(), &StubShifter::new())
            .await
            .unwrap();
        assert!((output.track.duration_ms() - 6250.0).abs() < 0.1);
    }

    #[tokio::test]
    async fn test_perfect_tier_places_clip_unchanged() {
        // 2040 ms into a 2000 ms window: 2% deviation, inside tolerance
        let segments = vec![synth(1.0, 3.0, Some(2040.0))];
        let shifter = StubShifter::new();
        let output = align_segments(&segments, &append_config(), &shifter)
            .await
            .unwrap();

        assert_eq!(output.placed[0].outcome, SegmentOutcome::AsIs);
        assert_eq!(shifter.call_count(), 0);
        // 1000 ms gap + the clip, unmodified
        assert!((output.track.duration_ms() - 3040.0).abs() < 0.1);
    }

    #[tokio::test]
    async fn test_silent_segment_contributes_exact_window() {
        let segments = vec![synth(0.0, 1.0, Some(1000.0)), synth(2.0, 4.0, None)];
        let shifter = StubShifter::new();
        let output = align_segments(&segments, &append_config(), &shifter)
            .await
            .unwrap();

        assert_eq!(output.placed[1].outcome, SegmentOutcome::Silent);
        // Excluded from tempo statistics and from shifter calls
        assert_eq!(output.report.silent, 1);
        assert_eq!(output.report.tempo_adjusted, 0);
        assert_eq!(shifter.call_count(), 0);
        // 1000 clip + 1000 gap + 2000 silence
        assert!((output.track.duration_ms() - 4000.0).abs() < 0.1);
    }

    #[tokio::test]
    async fn test_reference_scenario_truncates_after_rejected_borrow() {
        // start=1.0, end=3.0 (target 2000 ms), clip 3000 ms → ratio 1.5 →
        // aggressive → ideal 0.667 clamped to 0.7 → ~4286 ms adjusted →
        // ~2286 ms overhang; first segment has no leading gap and the
        // capped trailing gap covers less than 80%, so the clip is
        // truncated to exactly the target window.
        let segments = vec![synth(1.0, 3.0, Some(3000.0))];
        let output = align_segments(&segments, &append_config(), &StubShifter::new())
            .await
            .unwrap();

        match &output.placed[0].outcome {
            SegmentOutcome::Truncated { trimmed_ms } => {
                assert!((trimmed_ms - 2285.7).abs() < 2.0, "trimmed {}", trimmed_ms);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
        // 1000 ms gap + exactly 2000 ms of clip
        assert!((output.track.duration_ms() - 3000.0).abs() < 0.1);
    }

    #[tokio::test]
    async fn test_borrow_accepted_with_roomy_gaps() {
        let segments = vec![
            synth(0.0, 1.0, Some(1000.0)),
            synth(5.0, 7.0, Some(2600.0)),
            synth(12.0, 13.0, Some(1000.0)),
        ];
        let output = align_segments(&segments, &append_config(), &StubShifter::new())
            .await
            .unwrap();

        match &output.placed[1].outcome {
            SegmentOutcome::Borrowed {
                before_ms,
                after_ms,
                factor,
            } => {
                assert!(*before_ms > 0.0 && *after_ms > 0.0);
                // Never more than half of either 4000/5000 ms gap
                assert!(*before_ms <= 2000.0 && *after_ms <= 2500.0);
                assert!(*factor < 1.0);
            }
            other => panic!("expected borrow, got {:?}", other),
        }
        // Later segments still land on their absolute offsets
        assert!((output.track.duration_ms() - 13000.0).abs() < 0.1);
        assert_eq!(output.report.borrowed, 1);
    }

    #[tokio::test]
    async fn test_short_clip_is_padded_to_window() {
        // 1000 ms into a 2000 ms window → ratio 0.5 → aggressive → ideal
        // 2.0 clamped to 1.4, which shortens further; the shortfall is
        // made up with trailing silence to exactly the target.
        let segments = vec![synth(0.0, 2.0, Some(1000.0))];
        let output = align_segments(&segments, &append_config(), &StubShifter::new())
            .await
            .unwrap();

        assert!(matches!(
            output.placed[0].outcome,
            SegmentOutcome::Padded { .. }
        ));
        assert!((output.track.duration_ms() - 2000.0).abs() < 0.1);
    }

    #[tokio::test]
    async fn test_primitive_failure_recovers_with_unmodified_clip() {
        // Gentle-tier mismatch, but the shifter fails: the original clip
        // is used, its 200 ms overhang cannot be borrowed, and the clip is
        // truncated to the window. The run itself succeeds.
        let segments = vec![synth(0.0, 2.0, Some(2200.0))];
        let output = align_segments(&segments, &append_config(), &FailingShifter)
            .await
            .unwrap();

        assert!(matches!(
            output.placed[0].outcome,
            SegmentOutcome::Truncated { .. }
        ));
        assert_eq!(
            output.placed[0].recovered,
            Some(RecoveredFailure::TempoAdjustment)
        );
        assert_eq!(output.report.recovered_failures, 1);
        assert!((output.track.duration_ms() - 2000.0).abs() < 0.1);
    }

    #[tokio::test]
    async fn test_one_bad_segment_never_aborts_the_run() {
        let segments = vec![
            synth(0.0, 1.0, Some(1000.0)),
            synth(2.0, 3.0, Some(1300.0)), // would need correction; shifter fails
            synth(4.0, 5.0, Some(1000.0)),
        ];
        let output = align_segments(&segments, &append_config(), &FailingShifter)
            .await
            .unwrap();

        assert_eq!(output.placed.len(), 3);
        assert_eq!(output.placed[0].outcome, SegmentOutcome::AsIs);
        assert_eq!(output.placed[2].outcome, SegmentOutcome::AsIs);
        assert_eq!(output.report.recovered_failures, 1);
    }

    #[tokio::test]
    async fn test_gentle_adjustment_borrows_the_residual() {
        // 2240 ms into a 2000 ms window → ratio 1.12 → gentle tier applies
        // half the correction; the remaining overhang is borrowed from the
        // leading gap and the wide-open trailing gap of the last segment.
        let segments = vec![synth(0.0, 1.0, Some(1000.0)), synth(2.0, 4.0, Some(2240.0))];
        let output = align_segments(&segments, &append_config(), &StubShifter::new())
            .await
            .unwrap();

        match &output.placed[1].outcome {
            SegmentOutcome::Borrowed { factor, .. } => {
                let ideal = 1.0 / 1.12;
                let expected = 1.0 + (ideal - 1.0) * 0.5;
                assert!((factor - expected).abs() < 1e-3);
            }
            other => panic!("expected a borrowed placement, got {:?}", other),
        }
        assert_eq!(output.report.recovered_failures, 0);
    }

    #[tokio::test]
    async fn test_append_mode_accounts_every_millisecond() {
        let segments = vec![
            synth(1.0, 2.0, Some(1000.0)),
            synth(3.0, 4.0, None),
            synth(6.0, 7.5, Some(1500.0)),
        ];
        let output = align_segments(&segments, &append_config(), &StubShifter::new())
            .await
            .unwrap();

        // gap 1000 + clip 1000 + gap 1000 + silence 1000 + gap 2000 + clip 1500
        assert!((output.track.duration_ms() - 7500.0).abs() < 0.1);
        assert_eq!(output.report.total_segments, 3);
    }

    #[tokio::test]
    async fn test_overlay_mode_with_silent_and_truncated_segments() {
        let segments = vec![
            synth(0.0, 2.0, None),
            synth(2.0, 4.0, Some(6000.0)), // far too long, truncated
        ];
        let output = align_segments(&segments, &overlay_config(), &StubShifter::new())
            .await
            .unwrap();

        assert_eq!(output.placed[0].outcome, SegmentOutcome::Silent);
        assert!(matches!(
            output.placed[1].outcome,
            SegmentOutcome::Truncated { .. }
        ));
        assert!((output.track.duration_ms() - 4000.0).abs() < 0.1);
    }
}
