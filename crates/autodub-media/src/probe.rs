//! FFprobe audio information.

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

/// Audio stream information.
#[derive(Debug, Clone)]
pub struct AudioInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel count
    pub channels: u32,
    /// Audio codec
    pub codec: String,
    /// File size in bytes
    pub size: u64,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u32>,
}

/// Probe a media file for its audio stream.
///
/// Works on both audio files and videos carrying an audio track.
pub async fn probe_audio(path: impl AsRef<Path>) -> MediaResult<AudioInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    // Check FFprobe exists
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: "FFprobe failed".to_string(),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    parse_probe_output(&output.stdout)
}

/// Get audio duration in milliseconds.
pub async fn get_duration_ms(path: impl AsRef<Path>) -> MediaResult<f64> {
    let info = probe_audio(path).await?;
    Ok(info.duration * 1000.0)
}

/// Parse ffprobe JSON into [`AudioInfo`].
fn parse_probe_output(bytes: &[u8]) -> MediaResult<AudioInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(bytes)?;

    // Find audio stream
    let audio_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "audio")
        .ok_or_else(|| MediaError::InvalidAudio("No audio stream found".to_string()))?;

    // Parse duration
    let duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    // Parse size
    let size = probe
        .format
        .size
        .as_ref()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);

    // Parse sample rate
    let sample_rate = audio_stream
        .sample_rate
        .as_ref()
        .and_then(|r| r.parse::<u32>().ok())
        .unwrap_or(0);

    Ok(AudioInfo {
        duration,
        sample_rate,
        channels: audio_stream.channels.unwrap_or(0),
        codec: audio_stream.codec_name.clone().unwrap_or_default(),
        size,
    })
}
