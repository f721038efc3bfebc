//! Master track assembly.
//!
//! Two placement strategies implement one contract: overlay onto a
//! fixed-length buffer, or sequential append with explicit silence. The
//! strategy owns the only mutable state of the composition pass (the track
//! buffer and, for append mode, the implicit write cursor at its end), so
//! segments must be placed strictly in timeline order.

use crate::buffer::AudioClip;

use super::borrow::BorrowPlan;

/// The original-timeline window a clip is placed into.
#[derive(Debug, Clone, Copy)]
pub struct TargetWindow {
    pub start_ms: f64,
    pub duration_ms: f64,
}

/// Placement strategy over the master track.
pub(super) trait Placement {
    /// Place a final clip into its window, shifted/extended by an accepted
    /// borrow.
    fn place(&mut self, clip: &AudioClip, window: TargetWindow, borrow: Option<&BorrowPlan>);

    /// Render the window as pure silence (failed synthesis).
    fn place_silence(&mut self, window: TargetWindow);

    /// Hand over the finished master track.
    fn finish(self: Box<Self>) -> AudioClip;
}

/// Fixed-length track; clips are additively overlaid at their offsets.
pub(super) struct OverlayTimeline {
    track: AudioClip,
}

impl OverlayTimeline {
    /// Allocate a silent track ending at the last segment's end.
    pub(super) fn new(total_duration_ms: f64, sample_rate: u32) -> Self {
        Self {
            track: AudioClip::silent(total_duration_ms, sample_rate),
        }
    }
}

impl Placement for OverlayTimeline {
    fn place(&mut self, clip: &AudioClip, window: TargetWindow, borrow: Option<&BorrowPlan>) {
        // An accepted borrow-before moves the clip earlier into the idle gap
        let position_ms = match borrow {
            Some(plan) => (window.start_ms - plan.before_ms).max(0.0),
            None => window.start_ms,
        };
        self.track.overlay_at(clip, position_ms);
    }

    fn place_silence(&mut self, _window: TargetWindow) {
        // The pre-allocated buffer is already silent there
    }

    fn finish(self: Box<Self>) -> AudioClip {
        self.track
    }
}

/// Growable track built by sequential append with explicit silence.
pub(super) struct AppendTimeline {
    track: AudioClip,
}

impl AppendTimeline {
    pub(super) fn new(sample_rate: u32) -> Self {
        Self {
            track: AudioClip::silent(0.0, sample_rate),
        }
    }

    /// Append silence to cover the gap up to `start_ms`, less any borrowed
    /// amount. The gap is never negative: a previous segment may already
    /// have run past this segment's start.
    fn cover_gap(&mut self, start_ms: f64, borrowed_before_ms: f64) {
        let gap_ms = (start_ms - self.track.duration_ms() - borrowed_before_ms).max(0.0);
        if gap_ms > 0.0 {
            self.track.append_silence(gap_ms);
        }
    }
}

impl Placement for AppendTimeline {
    fn place(&mut self, clip: &AudioClip, window: TargetWindow, borrow: Option<&BorrowPlan>) {
        let borrowed_before = borrow.map(|plan| plan.before_ms).unwrap_or(0.0);
        self.cover_gap(window.start_ms, borrowed_before);
        self.track.append(clip);
    }

    fn place_silence(&mut self, window: TargetWindow) {
        self.cover_gap(window.start_ms, 0.0);
        self.track.append_silence(window.duration_ms);
    }

    fn finish(self: Box<Self>) -> AudioClip {
        self.track
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 44_100;

    fn tone(duration_ms: f64) -> AudioClip {
        let len = ((duration_ms / 1000.0) * RATE as f64).round() as usize;
        AudioClip::new(vec![0.5; len], RATE)
    }

    fn window(start_ms: f64, duration_ms: f64) -> TargetWindow {
        TargetWindow {
            start_ms,
            duration_ms,
        }
    }

    #[test]
    fn test_overlay_track_length_is_fixed() {
        let mut timeline = Box::new(OverlayTimeline::new(5000.0, RATE));
        timeline.place(&tone(2000.0), window(1000.0, 2000.0), None);
        // Clip running past the end is clamped
        timeline.place(&tone(3000.0), window(4000.0, 1000.0), None);

        let track = timeline.finish();
        assert!((track.duration_ms() - 5000.0).abs() < 0.1);
    }

    #[test]
    fn test_overlay_borrow_shifts_placement_earlier() {
        let mut timeline = Box::new(OverlayTimeline::new(4000.0, RATE));
        let plan = BorrowPlan {
            before_ms: 500.0,
            after_ms: 0.0,
        };
        timeline.place(&tone(1000.0), window(2000.0, 1000.0), Some(&plan));

        let track = timeline.finish();
        let at_1600 = ((1.6 * RATE as f64) as usize).min(track.len_samples() - 1);
        let at_1400 = (1.4 * RATE as f64) as usize;
        assert!(track.samples()[at_1600] != 0.0);
        assert_eq!(track.samples()[at_1400], 0.0);
    }

    #[test]
    fn test_append_inserts_gap_silence() {
        let mut timeline = Box::new(AppendTimeline::new(RATE));
        timeline.place(&tone(1000.0), window(500.0, 1000.0), None);
        timeline.place(&tone(1000.0), window(3000.0, 1000.0), None);

        let track = timeline.finish();
        // 500 gap + 1000 clip + 1500 gap + 1000 clip
        assert!((track.duration_ms() - 4000.0).abs() < 0.1);
        let in_gap = (2.0 * RATE as f64) as usize;
        assert_eq!(track.samples()[in_gap], 0.0);
    }

    #[test]
    fn test_append_borrow_shrinks_emitted_silence() {
        let mut timeline = Box::new(AppendTimeline::new(RATE));
        timeline.place(&tone(1000.0), window(0.0, 1000.0), None);
        let plan = BorrowPlan {
            before_ms: 400.0,
            after_ms: 0.0,
        };
        timeline.place(&tone(2000.0), window(3000.0, 1600.0), Some(&plan));

        let track = timeline.finish();
        // 1000 clip + (2000 - 400) gap + 2000 clip
        assert!((track.duration_ms() - 4600.0).abs() < 0.1);
    }

    #[test]
    fn test_append_gap_never_negative() {
        let mut timeline = Box::new(AppendTimeline::new(RATE));
        // First clip overruns the second segment's start
        timeline.place(&tone(2500.0), window(0.0, 1000.0), None);
        timeline.place(&tone(500.0), window(2000.0, 500.0), None);

        let track = timeline.finish();
        assert!((track.duration_ms() - 3000.0).abs() < 0.1);
    }

    #[test]
    fn test_append_silent_segment_contributes_exact_window() {
        let mut timeline = Box::new(AppendTimeline::new(RATE));
        timeline.place_silence(window(1000.0, 2000.0));

        let track = timeline.finish();
        assert!((track.duration_ms() - 3000.0).abs() < 0.1);
        assert!(track.samples().iter().all(|s| *s == 0.0));
    }
}
