use std::path::Path;

use async_trait::async_trait;

pub mod docker;
pub mod error;
pub mod result;

pub use docker::{DockerConfig, DockerTranscriber};
pub use error::TranscribeError;
pub use result::collect_transcript;

/// Turns one audio chunk into its plain-text transcript.
#[async_trait]
pub trait ChunkTranscriber: Send + Sync {
    async fn transcribe_chunk(&self, chunk: &Path) -> Result<String, TranscribeError>;
}
