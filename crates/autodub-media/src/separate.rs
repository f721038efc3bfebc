//! Vocal/background source separation.
//!
//! The dubbed track replaces the original vocals, but the original
//! background (music, ambience) must survive. The primary path shells out
//! to the `demucs` CLI in two-stem mode; systems without demucs fall back
//! to an FFmpeg volume duck of the original audio so the pipeline still
//! produces output.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Configuration for source separation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeparationConfig {
    /// When false, skip demucs entirely and use the fallback.
    pub enabled: bool,

    /// Demucs model name.
    pub model: String,

    /// Background gain used by the volume-duck fallback.
    ///
    /// The fallback cannot remove the original vocals, so it ducks the
    /// whole original mix under the dubbed track instead.
    pub fallback_background_volume: f64,

    /// Timeout for the demucs invocation, seconds.
    pub timeout_secs: u64,
}

impl Default for SeparationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "htdemucs".to_string(),
            fallback_background_volume: 0.1,
            timeout_secs: 1800,
        }
    }
}

impl SeparationConfig {
    /// Builder-style setter to disable separation.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Separated stems.
#[derive(Debug, Clone)]
pub struct SeparatedAudio {
    pub vocals: PathBuf,
    pub background: PathBuf,
}

/// Separate an audio file into vocals and background.
///
/// Separation failure is not fatal: any demucs problem degrades to the
/// FFmpeg fallback, which copies the original as "vocals" and renders a
/// ducked copy as "background".
pub async fn separate_audio(
    input: &Path,
    work_dir: &Path,
    config: &SeparationConfig,
) -> MediaResult<SeparatedAudio> {
    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }

    if !config.enabled {
        info!("Source separation disabled, using volume-duck fallback");
        return fallback_separation(input, work_dir, config).await;
    }

    if which::which("demucs").is_err() {
        warn!("demucs not found in PATH, using volume-duck fallback");
        return fallback_separation(input, work_dir, config).await;
    }

    match run_demucs(input, work_dir, config).await {
        Ok(separated) => Ok(separated),
        Err(e) => {
            warn!(error = %e, "Source separation failed, using volume-duck fallback");
            fallback_separation(input, work_dir, config).await
        }
    }
}

/// Run demucs in two-stem mode and locate its output files.
async fn run_demucs(
    input: &Path,
    work_dir: &Path,
    config: &SeparationConfig,
) -> MediaResult<SeparatedAudio> {
    let out_dir = work_dir.join("separated");

    info!(model = %config.model, "Separating audio with demucs");

    let mut child = Command::new("demucs")
        .args(["--two-stems", "vocals", "-n", &config.model, "-o"])
        .arg(&out_dir)
        .arg(input)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;

    let wait = tokio::time::timeout(
        std::time::Duration::from_secs(config.timeout_secs),
        child.wait(),
    )
    .await;

    let status = match wait {
        Ok(status) => status?,
        Err(_) => {
            let _ = child.kill().await;
            return Err(MediaError::Timeout(config.timeout_secs));
        }
    };

    if !status.success() {
        return Err(MediaError::InvalidAudio(format!(
            "demucs exited with status {:?}",
            status.code()
        )));
    }

    // demucs writes <out>/<model>/<input stem>/{vocals,no_vocals}.wav
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem_dir = out_dir.join(&config.model).join(&stem);
    let vocals = stem_dir.join("vocals.wav");
    let background = stem_dir.join("no_vocals.wav");

    if !vocals.exists() || !background.exists() {
        return Err(MediaError::InvalidAudio(format!(
            "demucs output missing under {}",
            stem_dir.display()
        )));
    }

    debug!(
        vocals = %vocals.display(),
        background = %background.display(),
        "Separation complete"
    );

    Ok(SeparatedAudio { vocals, background })
}

/// FFmpeg fallback: original audio as vocals, a ducked copy as background.
async fn fallback_separation(
    input: &Path,
    work_dir: &Path,
    config: &SeparationConfig,
) -> MediaResult<SeparatedAudio> {
    let vocals = work_dir.join("vocals.wav");
    let background = work_dir.join("background.wav");

    let runner = FfmpegRunner::new();

    let copy_cmd = FfmpegCommand::new(input, &vocals)
        .no_video()
        .sample_rate(44_100)
        .channels(2);
    runner.run(&copy_cmd).await?;

    let duck_cmd = FfmpegCommand::new(input, &background)
        .no_video()
        .audio_filter(format!("volume={:.2}", config.fallback_background_volume))
        .sample_rate(44_100)
        .channels(2);
    runner.run(&duck_cmd).await?;

    Ok(SeparatedAudio { vocals, background })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SeparationConfig::default();
        assert!(config.enabled);
        assert_eq!(config.model, "htdemucs");
        assert!((config.fallback_background_volume - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_disabled_builder() {
        let config = SeparationConfig::default().disabled();
        assert!(!config.enabled);
    }

    #[tokio::test]
    async fn test_missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = separate_audio(
            Path::new("/nonexistent/audio.wav"),
            dir.path(),
            &SeparationConfig::default(),
        )
        .await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }
}
