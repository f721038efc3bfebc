//! Borrowing idle silence around a segment to absorb residual overhang.
//!
//! Tempo correction is deliberately partial, so a corrected clip can still
//! be longer than its window. Before falling back to truncation, the engine
//! tries to reallocate part of the idle gaps on either side: never more than
//! half of a gap, and never enough to leave negative silence behind.

use super::analyze::TimingRecord;
use super::config::AlignmentConfig;

/// Accepted borrow amounts for one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorrowPlan {
    /// Silence reclaimed from the gap before the segment.
    pub before_ms: f64,
    /// Silence reclaimed from the gap after the segment.
    pub after_ms: f64,
}

impl BorrowPlan {
    pub fn total_ms(&self) -> f64 {
        self.before_ms + self.after_ms
    }
}

/// Decide whether adjacent silence can absorb an overhang.
///
/// The unbounded trailing gap of the last segment is capped at
/// `max_borrowable_gap_ms` before the half-gap rule applies. Returns `None`
/// when the borrowable total covers less than `borrow_acceptance` of the
/// overhang; the caller then falls back to truncation. Rejection is a
/// policy decision, not an error.
pub fn plan_borrow(
    overhang_ms: f64,
    record: &TimingRecord,
    config: &AlignmentConfig,
) -> Option<BorrowPlan> {
    if overhang_ms <= 0.0 {
        return None;
    }

    let before_ms = (overhang_ms / 2.0).min(record.silence_before_ms.max(0.0) * 0.5);

    let bounded_after = record
        .silence_after_ms
        .min(config.max_borrowable_gap_ms)
        .max(0.0);
    let after_ms = (overhang_ms / 2.0).min(bounded_after * 0.5);

    if before_ms + after_ms >= config.borrow_acceptance * overhang_ms {
        Some(BorrowPlan {
            before_ms,
            after_ms,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(silence_before_ms: f64, silence_after_ms: f64) -> TimingRecord {
        TimingRecord {
            index: 0,
            start_ms: 5000.0,
            target_duration_ms: 2000.0,
            actual_duration_ms: 3000.0,
            duration_ratio: 1.5,
            silence_before_ms,
            silence_after_ms,
            needs_adjustment: true,
        }
    }

    #[test]
    fn test_borrow_accepted_with_roomy_gaps() {
        let config = AlignmentConfig::default();
        let plan = plan_borrow(1000.0, &record(4000.0, 5000.0), &config).unwrap();

        // Half the overhang from each side, both well under half a gap
        assert!((plan.before_ms - 500.0).abs() < 1e-9);
        assert!((plan.after_ms - 500.0).abs() < 1e-9);
        assert!((plan.total_ms() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_borrow_never_takes_more_than_half_a_gap() {
        let config = AlignmentConfig::default();
        let plan = plan_borrow(1000.0, &record(600.0, 5000.0), &config).unwrap();
        assert!((plan.before_ms - 300.0).abs() < 1e-9);
        assert!(plan.before_ms >= 0.0 && plan.after_ms >= 0.0);
    }

    #[test]
    fn test_borrow_rejected_when_gaps_too_tight() {
        let config = AlignmentConfig::default();
        // 150 + 100 = 250 < 0.8 * 1000
        assert!(plan_borrow(1000.0, &record(300.0, 200.0), &config).is_none());
    }

    #[test]
    fn test_infinite_trailing_gap_is_capped() {
        let config = AlignmentConfig::default();
        let plan = plan_borrow(30_000.0, &record(0.0, f64::INFINITY), &config);
        // after is capped at half of max_borrowable_gap_ms = 5000,
        // which covers only a third of the overhang
        assert!(plan.is_none());

        let plan = plan_borrow(8_000.0, &record(30_000.0, f64::INFINITY), &config).unwrap();
        assert!((plan.after_ms - 4000.0).abs() < 1e-9);
        assert!(plan.after_ms.is_finite());
    }

    #[test]
    fn test_no_overhang_means_no_borrow() {
        let config = AlignmentConfig::default();
        assert!(plan_borrow(0.0, &record(1000.0, 1000.0), &config).is_none());
        assert!(plan_borrow(-50.0, &record(1000.0, 1000.0), &config).is_none());
    }
}
