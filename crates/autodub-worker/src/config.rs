//! Worker configuration.

use std::path::PathBuf;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Work directory for per-run temporary files
    pub work_dir: PathBuf,
    /// Keep the per-run work directory after a successful run
    pub keep_work_dir: bool,
    /// Timeout for a single tempo-chain FFmpeg invocation, seconds
    pub tempo_timeout_secs: u64,
    /// Timeout for the demucs invocation, seconds
    pub separation_timeout_secs: u64,
    /// Background gain in the final mix
    pub background_volume: f64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("/tmp/autodub"),
            keep_work_dir: false,
            tempo_timeout_secs: 60,
            separation_timeout_secs: 1800,
            background_volume: 0.7,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            work_dir: std::env::var("AUTODUB_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            keep_work_dir: std::env::var("AUTODUB_KEEP_WORK_DIR")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.keep_work_dir),
            tempo_timeout_secs: std::env::var("AUTODUB_TEMPO_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.tempo_timeout_secs),
            separation_timeout_secs: std::env::var("AUTODUB_SEPARATION_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.separation_timeout_secs),
            background_volume: std::env::var("AUTODUB_BACKGROUND_VOLUME")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.background_volume),
        }
    }
}
