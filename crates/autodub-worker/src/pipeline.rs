//! Stage orchestration for one dubbing run.
//!
//! Stages run strictly in sequence: probe → extract → separate → align →
//! mix → mux. The alignment engine recovers its own per-segment failures;
//! a stage here fails the run only when no output could be produced at all.

use std::path::PathBuf;

use tracing::{info, warn};
use uuid::Uuid;

use autodub_media::{
    align_segments, extract_audio, mix_with_background, mux_video, probe_audio, separate_audio,
    AlignmentConfig, FfmpegTempoShifter, MixConfig, PlacementMode, SeparationConfig,
    SynthesizedSegment,
};
use autodub_models::AlignmentReport;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::manifest;

/// Options for one dubbing run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Source video file
    pub video: PathBuf,
    /// Segment manifest (JSON) with synthesized clip paths
    pub manifest: PathBuf,
    /// Output video path
    pub output: PathBuf,
    /// Placement strategy for the master track
    pub mode: PlacementMode,
    /// Whether to run demucs source separation
    pub separation: bool,
    /// Optional path for the alignment report JSON
    pub report: Option<PathBuf>,
}

/// Run one dubbing run end to end.
pub async fn run_pipeline(
    options: &PipelineOptions,
    config: &WorkerConfig,
) -> WorkerResult<AlignmentReport> {
    if !options.video.exists() {
        return Err(WorkerError::InputNotFound(options.video.clone()));
    }

    let run_id = Uuid::new_v4();
    info!(
        run_id = %run_id,
        video = %options.video.display(),
        mode = ?options.mode,
        "Starting dubbing run"
    );

    // Validate the manifest before allocating anything
    let segments = manifest::load_manifest(&options.manifest).await?;

    let work_dir = config.work_dir.join(run_id.to_string());
    tokio::fs::create_dir_all(&work_dir).await?;

    let result = run_stages(options, config, &segments, &work_dir).await;

    match &result {
        Ok(report) => {
            info!(
                run_id = %run_id,
                output = %options.output.display(),
                segments = report.total_segments,
                recovered = report.recovered_failures,
                "Dubbing run completed"
            );
            if config.keep_work_dir {
                info!(work_dir = %work_dir.display(), "Keeping work directory");
            } else {
                let _ = tokio::fs::remove_dir_all(&work_dir).await;
            }
        }
        Err(e) => {
            // Leave intermediates behind for inspection
            warn!(
                run_id = %run_id,
                work_dir = %work_dir.display(),
                error = %e,
                "Dubbing run failed; work directory kept"
            );
        }
    }

    result
}

async fn run_stages(
    options: &PipelineOptions,
    config: &WorkerConfig,
    segments: &[autodub_models::SpeechSegment],
    work_dir: &std::path::Path,
) -> WorkerResult<AlignmentReport> {
    // Probe the source so obviously broken inputs fail before any work
    let source_info = probe_audio(&options.video).await?;
    info!(
        duration_secs = source_info.duration,
        sample_rate = source_info.sample_rate,
        codec = %source_info.codec,
        "Probed source audio"
    );

    let source_audio = work_dir.join("source.wav");
    extract_audio(&options.video, &source_audio).await?;

    let separation_config = SeparationConfig {
        enabled: options.separation,
        timeout_secs: config.separation_timeout_secs,
        ..SeparationConfig::default()
    };
    let separated = separate_audio(&source_audio, work_dir, &separation_config).await?;

    // Decode the synthesized clips; unreadable clips degrade to silence
    let synthesized: Vec<SynthesizedSegment> = segments
        .iter()
        .cloned()
        .map(SynthesizedSegment::load)
        .collect();

    let align_config = AlignmentConfig::default().with_mode(options.mode);
    let shifter = FfmpegTempoShifter::new().with_timeout(config.tempo_timeout_secs);
    let aligned = align_segments(&synthesized, &align_config, &shifter).await?;

    let dubbed_vocals = work_dir.join("dubbed_vocals.wav");
    aligned.track.to_wav_file(&dubbed_vocals)?;

    let mix_config = MixConfig::default().with_background_volume(config.background_volume);
    let mixed = work_dir.join("mixed.wav");
    let final_audio =
        mix_with_background(&dubbed_vocals, &separated.background, &mixed, &mix_config).await?;

    mux_video(&options.video, &final_audio, &options.output).await?;

    if let Some(report_path) = &options.report {
        let json = serde_json::to_vec_pretty(&aligned.report)?;
        tokio::fs::write(report_path, json).await?;
        info!(report = %report_path.display(), "Wrote alignment report");
    }

    Ok(aligned.report)
}
