//! Segment manifest loading.
//!
//! The manifest is the handover point from the upstream collaborators
//! (transcription, translation, synthesis): a JSON array of segments, each
//! carrying its window on the original timeline and the path to its
//! synthesized clip. Audio paths are resolved relative to the manifest
//! file so a manifest and its clips can travel as one directory.

use std::path::Path;

use tracing::debug;

use autodub_models::{validate_manifest, SpeechSegment};

use crate::error::WorkerResult;

/// Load and validate a segment manifest.
pub async fn load_manifest(path: &Path) -> WorkerResult<Vec<SpeechSegment>> {
    let bytes = tokio::fs::read(path).await?;
    let mut segments: Vec<SpeechSegment> = serde_json::from_slice(&bytes)?;

    validate_manifest(&segments)?;

    // Resolve clip paths relative to the manifest location
    if let Some(base) = path.parent() {
        for segment in &mut segments {
            if let Some(audio) = &segment.audio {
                if audio.is_relative() {
                    segment.audio = Some(base.join(audio));
                }
            }
        }
    }

    debug!(
        manifest = %path.display(),
        segments = segments.len(),
        voiced = segments.iter().filter(|s| s.has_audio()).count(),
        "Loaded segment manifest"
    );

    Ok(segments)
}
