//! Audio extraction, mixing, and final muxing.
//!
//! These operations sit on the video↔audio boundary: pull the original
//! audio out of the source video, mix the dubbed vocal track over the
//! separated background, and mux the result back in with the video stream
//! copied untouched.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Mixing configuration for vocals over background.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixConfig {
    /// Gain applied to the dubbed vocal track.
    pub vocals_volume: f64,
    /// Gain applied to the separated background track.
    pub background_volume: f64,
    /// Output sample rate.
    pub sample_rate: u32,
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            vocals_volume: 1.0,
            background_volume: 0.7,
            sample_rate: 44_100,
        }
    }
}

impl MixConfig {
    /// Builder-style setter for the background gain.
    pub fn with_background_volume(mut self, volume: f64) -> Self {
        self.background_volume = volume.max(0.0);
        self
    }
}

/// Build the amix filter graph for one vocals + background pair.
fn build_mix_filter(config: &MixConfig) -> String {
    format!(
        "[0:a]volume={:.2}[vocals];[1:a]volume={:.2}[bg];[vocals][bg]amix=inputs=2:duration=longest",
        config.vocals_volume, config.background_volume
    )
}

/// Extract the audio track of a video as 44.1 kHz stereo WAV.
pub async fn extract_audio(video: &Path, output: &Path) -> MediaResult<()> {
    if !video.exists() {
        return Err(MediaError::FileNotFound(video.to_path_buf()));
    }

    let cmd = FfmpegCommand::new(video, output)
        .no_video()
        .sample_rate(44_100)
        .channels(2);
    FfmpegRunner::new().run(&cmd).await
}

/// Mix dubbed vocals with the separated background.
///
/// On mixing failure the dubbed vocals are returned unmixed; losing the
/// background is better than losing the run.
pub async fn mix_with_background(
    vocals: &Path,
    background: &Path,
    output: &Path,
    config: &MixConfig,
) -> MediaResult<PathBuf> {
    info!(
        vocals = %vocals.display(),
        background = %background.display(),
        "Mixing dubbed vocals with background"
    );

    let cmd = FfmpegCommand::new(vocals, output)
        .add_input(background)
        .filter_complex(build_mix_filter(config))
        .sample_rate(config.sample_rate)
        .channels(2);

    match FfmpegRunner::new().run(&cmd).await {
        Ok(()) => Ok(output.to_path_buf()),
        Err(e) => {
            warn!(error = %e, "Mixing failed, using dubbed vocals only");
            Ok(vocals.to_path_buf())
        }
    }
}

/// Mux the dubbed audio into the source video.
///
/// The video stream is copied; audio is re-encoded AAC with explicit
/// stream mapping so the original audio track is dropped.
pub async fn mux_video(video: &Path, audio: &Path, output: &Path) -> MediaResult<()> {
    if !video.exists() {
        return Err(MediaError::FileNotFound(video.to_path_buf()));
    }
    if !audio.exists() {
        return Err(MediaError::FileNotFound(audio.to_path_buf()));
    }

    info!(
        video = %video.display(),
        audio = %audio.display(),
        output = %output.display(),
        "Muxing dubbed audio into video"
    );

    let cmd = FfmpegCommand::new(video, output)
        .add_input(audio)
        .output_args(["-c:v", "copy"])
        .audio_codec("aac")
        .audio_bitrate("192k")
        .map("0:v:0")
        .map("1:a:0");

    FfmpegRunner::new().run(&cmd).await
}
