//! Applying tempo corrections through the external primitive.
//!
//! The engine talks to the primitive through [`TempoShifter`] so the
//! inherently order-dependent composition pass can be exercised without
//! shelling out to FFmpeg. Adjusted buffers and their backing temp files
//! are scoped to the call and released on every exit path.

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::buffer::AudioClip;
use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

use super::chain::{atempo_filter, decompose_factor};

/// External tempo-shifting primitive.
///
/// The returned clip's duration is approximately `original / factor`
/// (`factor > 1` shortens, `< 1` lengthens). Implementations may fail for
/// malformed input or on timeout; callers fall back to the unmodified clip.
#[async_trait]
pub trait TempoShifter: Send + Sync {
    async fn shift(&self, clip: &AudioClip, factor: f64) -> MediaResult<AudioClip>;
}

/// Tempo shifting via the FFmpeg atempo filter.
#[derive(Debug, Clone, Default)]
pub struct FfmpegTempoShifter {
    timeout_secs: Option<u64>,
}

impl FfmpegTempoShifter {
    pub fn new() -> Self {
        Self { timeout_secs: None }
    }

    /// Bound a single chain invocation; hitting the bound is a
    /// [`MediaError::TempoAdjustmentFailed`] like any other primitive failure.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

#[async_trait]
impl TempoShifter for FfmpegTempoShifter {
    async fn shift(&self, clip: &AudioClip, factor: f64) -> MediaResult<AudioClip> {
        let stages = decompose_factor(factor);
        if stages.is_empty() {
            return Ok(clip.clone());
        }

        let dir = tempfile::tempdir()?;
        let token = Uuid::new_v4();
        let input = dir.path().join(format!("{}_in.wav", token));
        let output = dir.path().join(format!("{}_out.wav", token));

        clip.to_wav_file(&input)
            .map_err(|e| MediaError::tempo_failed(factor, e.to_string()))?;

        let filter = atempo_filter(&stages);
        debug!(factor, filter = %filter, "Applying tempo chain");

        let cmd = FfmpegCommand::new(&input, &output)
            .audio_filter(&filter)
            .sample_rate(clip.sample_rate())
            .channels(1);

        let mut runner = FfmpegRunner::new();
        if let Some(secs) = self.timeout_secs {
            runner = runner.with_timeout(secs);
        }

        // Any primitive failure, including timeout, fails the whole chain
        runner
            .run(&cmd)
            .await
            .map_err(|e| MediaError::tempo_failed(factor, e.to_string()))?;

        // Reading the chained result back is the concatenation step
        let adjusted = AudioClip::from_wav_file(&output)
            .map_err(|e| MediaError::ConcatenationFailed(e.to_string()))?;

        Ok(adjusted)
        // temp dir (and both WAV files) dropped here on every path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unity_factor_skips_the_primitive() {
        // No stages to run means no FFmpeg dependency in this path
        let shifter = FfmpegTempoShifter::new();
        let clip = AudioClip::silent(500.0, 44_100);
        let out = shifter.shift(&clip, 1.0).await.unwrap();
        assert_eq!(out.len_samples(), clip.len_samples());
    }

    #[test]
    fn test_builder_sets_timeout() {
        let shifter = FfmpegTempoShifter::new().with_timeout(30);
        assert_eq!(shifter.timeout_secs, Some(30));
    }
}
