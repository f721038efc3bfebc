//! In-memory PCM audio clips.
//!
//! The reconciliation engine works on short mono clips at a fixed sample
//! rate. Clips round-trip through WAV files whenever audio is handed to an
//! external tool; multi-channel input is downmixed on load and 16-bit PCM
//! is written back out.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::MediaResult;

/// Default sample rate for the master track.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// A mono PCM audio clip.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioClip {
    /// Create a clip from raw mono samples.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Create a silent clip of the given duration.
    pub fn silent(duration_ms: f64, sample_rate: u32) -> Self {
        let len = ms_to_samples(duration_ms, sample_rate);
        Self {
            samples: vec![0.0; len],
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Clip duration in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.samples.len() as f64 * 1000.0 / self.sample_rate as f64
    }

    /// Additively overlay `other` starting at `position_ms`.
    ///
    /// Samples past the end of this buffer are dropped; the buffer never
    /// grows. Summed samples are clamped to [-1, 1].
    pub fn overlay_at(&mut self, other: &AudioClip, position_ms: f64) {
        debug_assert_eq!(self.sample_rate, other.sample_rate);
        let offset = ms_to_samples(position_ms.max(0.0), self.sample_rate);
        for (i, sample) in other.samples.iter().enumerate() {
            match self.samples.get_mut(offset + i) {
                Some(slot) => *slot = (*slot + sample).clamp(-1.0, 1.0),
                None => break,
            }
        }
    }

    /// Append another clip's samples.
    pub fn append(&mut self, other: &AudioClip) {
        debug_assert_eq!(self.sample_rate, other.sample_rate);
        self.samples.extend_from_slice(&other.samples);
    }

    /// Append silence of the given duration.
    pub fn append_silence(&mut self, duration_ms: f64) {
        let len = ms_to_samples(duration_ms.max(0.0), self.sample_rate);
        self.samples.resize(self.samples.len() + len, 0.0);
    }

    /// Keep only the first `duration_ms` of audio.
    pub fn truncate_ms(&mut self, duration_ms: f64) {
        let len = ms_to_samples(duration_ms.max(0.0), self.sample_rate);
        self.samples.truncate(len);
    }

    /// Drop the last `duration_ms` of audio.
    pub fn trim_tail_ms(&mut self, duration_ms: f64) {
        let drop = ms_to_samples(duration_ms.max(0.0), self.sample_rate);
        let keep = self.samples.len().saturating_sub(drop);
        self.samples.truncate(keep);
    }

    /// Extend with trailing silence until the clip is `duration_ms` long.
    ///
    /// A clip already at or beyond the target length is left untouched.
    pub fn pad_to_ms(&mut self, duration_ms: f64) {
        let target = ms_to_samples(duration_ms.max(0.0), self.sample_rate);
        if target > self.samples.len() {
            self.samples.resize(target, 0.0);
        }
    }

    /// Load a clip from a WAV file, downmixing to mono.
    pub fn from_wav_file(path: impl AsRef<Path>) -> MediaResult<Self> {
        let mut reader = WavReader::open(path)?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
            SampleFormat::Int => {
                let max = (1u32 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max))
                    .collect::<Result<_, _>>()?
            }
        };

        let samples = if channels == 1 {
            interleaved
        } else {
            interleaved
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect()
        };

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
        })
    }

    /// Write the clip to a 16-bit PCM WAV file.
    pub fn to_wav_file(&self, path: impl AsRef<Path>) -> MediaResult<()> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec)?;
        for sample in &self.samples {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(value)?;
        }
        writer.finalize()?;
        Ok(())
    }
}

/// Convert milliseconds to a sample count at the given rate.
fn ms_to_samples(ms: f64, sample_rate: u32) -> usize {
    ((ms / 1000.0) * sample_rate as f64).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 44_100;

    fn tone(duration_ms: f64) -> AudioClip {
        let len = ((duration_ms / 1000.0) * RATE as f64).round() as usize;
        AudioClip::new(vec![0.5; len], RATE)
    }

    #[test]
    fn test_silent_duration() {
        let clip = AudioClip::silent(2000.0, RATE);
        assert!((clip.duration_ms() - 2000.0).abs() < 0.1);
        assert!(clip.samples().iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_overlay_is_additive_and_clamped() {
        let mut track = AudioClip::silent(1000.0, RATE);
        let clip = tone(100.0);
        track.overlay_at(&clip, 500.0);
        track.overlay_at(&clip, 500.0);

        let offset = ((0.5 * RATE as f64) as usize) + 10;
        assert!((track.samples()[offset] - 1.0).abs() < 1e-6);
        assert_eq!(track.samples()[0], 0.0);
    }

    #[test]
    fn test_overlay_clamps_past_end() {
        let mut track = AudioClip::silent(1000.0, RATE);
        let clip = tone(500.0);
        track.overlay_at(&clip, 800.0);
        // Buffer never grows
        assert!((track.duration_ms() - 1000.0).abs() < 0.1);
    }

    #[test]
    fn test_append_and_silence() {
        let mut track = AudioClip::silent(0.0, RATE);
        track.append_silence(250.0);
        track.append(&tone(750.0));
        assert!((track.duration_ms() - 1000.0).abs() < 0.1);
    }

    #[test]
    fn test_truncate_exact() {
        let mut clip = tone(3000.0);
        clip.truncate_ms(2000.0);
        assert!((clip.duration_ms() - 2000.0).abs() < 0.1);
    }

    #[test]
    fn test_trim_tail_never_underflows() {
        let mut clip = tone(100.0);
        clip.trim_tail_ms(500.0);
        assert!(clip.is_empty());
    }

    #[test]
    fn test_pad_to_exact() {
        let mut clip = tone(1200.0);
        clip.pad_to_ms(2000.0);
        assert!((clip.duration_ms() - 2000.0).abs() < 0.1);

        // Padding never shortens
        clip.pad_to_ms(1000.0);
        assert!((clip.duration_ms() - 2000.0).abs() < 0.1);
    }

    #[test]
    fn test_wav_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");

        let clip = tone(500.0);
        clip.to_wav_file(&path).unwrap();

        let back = AudioClip::from_wav_file(&path).unwrap();
        assert_eq!(back.sample_rate(), RATE);
        assert_eq!(back.len_samples(), clip.len_samples());
        // 16-bit quantization keeps values close
        assert!((back.samples()[0] - 0.5).abs() < 1e-3);
    }
}
