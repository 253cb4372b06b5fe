use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while driving the transcription worker for one chunk.
/// Any of these aborts the job's remaining chunks; nothing is retried.
#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("invalid chunk path: {}", .0.display())]
    InvalidChunk(PathBuf),

    #[error("failed to spawn transcription worker: {0}")]
    Spawn(std::io::Error),

    #[error("transcription worker exited with code {code:?}: {stderr}")]
    WorkerExit { code: Option<i32>, stderr: String },

    #[error("expected result file missing: {}", .0.display())]
    ArtifactMissing(PathBuf),

    #[error("failed to parse transcription output: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
