//! Decomposing tempo factors into atempo-compatible stages.
//!
//! FFmpeg's atempo filter only operates correctly for a single-stage factor
//! in [0.5, 2.0]. A factor outside that range is decomposed into an ordered
//! chain of in-range stages whose product reproduces the target, and the
//! chain is handed to FFmpeg as one comma-joined filter expression.

/// Smallest factor a single atempo stage accepts.
pub const ATEMPO_MIN: f64 = 0.5;

/// Largest factor a single atempo stage accepts.
pub const ATEMPO_MAX: f64 = 2.0;

/// Residual stages closer to unity than this are dropped.
const RESIDUAL_EPSILON: f64 = 0.01;

/// Decompose a tempo factor into an ordered list of atempo stage factors.
///
/// The factor convention is uniform: `> 1` shortens audio, `< 1` lengthens
/// it, in every stage. An empty result means no filter invocation is
/// needed. The factor must be finite and positive.
pub fn decompose_factor(factor: f64) -> Vec<f64> {
    debug_assert!(factor.is_finite() && factor > 0.0);

    let mut stages = Vec::new();
    let mut remaining = factor;

    while remaining < ATEMPO_MIN || remaining > ATEMPO_MAX {
        if remaining < ATEMPO_MIN {
            stages.push(ATEMPO_MIN);
            remaining /= ATEMPO_MIN;
        } else {
            stages.push(ATEMPO_MAX);
            remaining /= ATEMPO_MAX;
        }
    }

    if (remaining - 1.0).abs() > RESIDUAL_EPSILON {
        stages.push(remaining);
    }

    stages
}

/// Render a stage list as an FFmpeg audio filter expression.
pub fn atempo_filter(stages: &[f64]) -> String {
    stages
        .iter()
        .map(|stage| format!("atempo={:.6}", stage))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stages: &[f64]) -> f64 {
        stages.iter().product()
    }

    #[test]
    fn test_unity_factor_needs_no_stages() {
        assert!(decompose_factor(1.0).is_empty());
        assert!(decompose_factor(1.005).is_empty());
    }

    #[test]
    fn test_in_range_factor_is_single_stage() {
        assert_eq!(decompose_factor(0.7), vec![0.7]);
        assert_eq!(decompose_factor(1.4), vec![1.4]);
    }

    #[test]
    fn test_small_factor_chains_down() {
        let stages = decompose_factor(0.3);
        assert_eq!(stages[0], ATEMPO_MIN);
        assert!((product(&stages) - 0.3).abs() / 0.3 < 1e-3);
    }

    #[test]
    fn test_large_factor_chains_up() {
        let stages = decompose_factor(2.5);
        assert_eq!(stages[0], ATEMPO_MAX);
        assert!((product(&stages) - 2.5).abs() / 2.5 < 1e-3);
    }

    #[test]
    fn test_stage_product_reproduces_factor() {
        let mut factor = 0.1;
        while factor < 4.0 {
            let stages = decompose_factor(factor);
            let p = product(&stages);
            // A dropped near-unity residual may leave the product off by
            // at most the residual epsilon
            assert!(
                (p - factor).abs() / factor < RESIDUAL_EPSILON + 1e-3,
                "factor {} decomposed to product {}",
                factor,
                p
            );
            for stage in &stages {
                assert!(
                    (ATEMPO_MIN..=ATEMPO_MAX).contains(stage),
                    "stage {} out of range for factor {}",
                    stage,
                    factor
                );
            }
            factor += 0.013;
        }
    }

    #[test]
    fn test_filter_rendering() {
        assert_eq!(atempo_filter(&[0.7]), "atempo=0.700000");
        assert_eq!(
            atempo_filter(&[2.0, 1.25]),
            "atempo=2.000000,atempo=1.250000"
        );
        assert_eq!(atempo_filter(&[]), "");
    }
}
