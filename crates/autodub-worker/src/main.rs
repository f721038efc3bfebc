//! Dubbing worker binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use autodub_media::PlacementMode;
use autodub_worker::{run_pipeline, PipelineOptions, WorkerConfig};

#[derive(Debug, Parser)]
#[command(
    name = "autodub-worker",
    about = "Replace speech in a video with synthesized dubbed audio"
)]
struct Args {
    /// Source video file
    #[arg(long)]
    video: PathBuf,

    /// Segment manifest (JSON) with synthesized clip paths
    #[arg(long)]
    manifest: PathBuf,

    /// Output video path
    #[arg(long)]
    output: PathBuf,

    /// Placement strategy for the master track
    #[arg(long, value_enum, default_value_t = Mode::Append)]
    mode: Mode,

    /// Skip demucs source separation (use the volume-duck fallback)
    #[arg(long)]
    no_separation: bool,

    /// Write the alignment report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Overlay,
    Append,
}

impl From<Mode> for PlacementMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Overlay => PlacementMode::Overlay,
            Mode::Append => PlacementMode::Append,
        }
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("autodub=info".parse().expect("valid directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let args = Args::parse();
    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let options = PipelineOptions {
        video: args.video,
        manifest: args.manifest,
        output: args.output,
        mode: args.mode.into(),
        separation: !args.no_separation,
        report: args.report,
    };

    match run_pipeline(&options, &config).await {
        Ok(report) => {
            info!(
                placed_as_is = report.placed_as_is,
                tempo_adjusted = report.tempo_adjusted,
                borrowed = report.borrowed,
                truncated = report.truncated,
                padded = report.padded,
                silent = report.silent,
                "Done"
            );
        }
        Err(e) => {
            error!("Dubbing run failed: {}", e);
            std::process::exit(1);
        }
    }
}
