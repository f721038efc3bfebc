//! Worker error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for worker operations.
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors that can occur during a dubbing run.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Manifest error: {0}")]
    Manifest(#[from] autodub_models::SegmentError),

    #[error(transparent)]
    Media(#[from] autodub_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}
