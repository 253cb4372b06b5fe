use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tracing::warn;

use super::error::TranscribeError;

/// Read and normalize the worker's result artifact for `chunk` into a
/// plain-text transcript, then delete the artifact.
///
/// The structured `<chunk>.json` artifact is preferred; a legacy
/// `<chunk>.txt` artifact is accepted as raw text. Artifact deletion is
/// best-effort and never fails the chunk.
pub async fn collect_transcript(chunk: &Path) -> Result<String, TranscribeError> {
    let json_path = artifact_path(chunk, "json");

    match fs::read_to_string(&json_path).await {
        Ok(raw) => {
            let text = extract_text(&raw)?;
            remove_artifact(&json_path).await;
            Ok(text)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            let txt_path = artifact_path(chunk, "txt");
            match fs::read_to_string(&txt_path).await {
                Ok(raw) => {
                    remove_artifact(&txt_path).await;
                    Ok(raw.trim().to_string())
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    Err(TranscribeError::ArtifactMissing(json_path))
                }
                Err(err) => Err(err.into()),
            }
        }
        Err(err) => Err(err.into()),
    }
}

/// `<chunk>.json`: the worker names its output after the full input
/// file name, extension included.
pub(crate) fn artifact_path(chunk: &Path, extension: &str) -> PathBuf {
    let mut name = chunk.as_os_str().to_os_string();
    name.push(format!(".{}", extension));
    PathBuf::from(name)
}

// Two artifact shapes exist in the wild: a segment list under
// "transcription" and a flat "text" field. Anything else that still
// parses falls back to the raw content.
fn extract_text(raw: &str) -> Result<String, TranscribeError> {
    let value: Value = serde_json::from_str(raw).map_err(TranscribeError::Parse)?;

    if let Some(segments) = value.get("transcription").and_then(Value::as_array) {
        let joined = segments
            .iter()
            .filter_map(|segment| segment.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        return Ok(joined.trim().to_string());
    }

    if let Some(text) = value.get("text").and_then(Value::as_str) {
        return Ok(text.trim().to_string());
    }

    Ok(raw.trim().to_string())
}

async fn remove_artifact(path: &Path) {
    if let Err(err) = fs::remove_file(path).await {
        warn!("Failed to remove result artifact {}: {}", path.display(), err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write_artifact(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_segment_list_is_joined_with_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let chunk = dir.path().join("chunk1.wav");
        let artifact = write_artifact(
            &dir,
            "chunk1.wav.json",
            r#"{"transcription":[{"text":" a"},{"text":"b "}]}"#,
        )
        .await;

        let text = collect_transcript(&chunk).await.unwrap();
        assert_eq!(text, "a b");
        assert!(!artifact.exists(), "artifact should be deleted after read");
    }

    #[tokio::test]
    async fn test_flat_text_field() {
        let dir = tempfile::tempdir().unwrap();
        let chunk = dir.path().join("chunk2.wav");
        write_artifact(&dir, "chunk2.wav.json", r#"{"text":"  hello  "}"#).await;

        let text = collect_transcript(&chunk).await.unwrap();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn test_unrecognized_json_falls_back_to_raw_content() {
        let dir = tempfile::tempdir().unwrap();
        let chunk = dir.path().join("chunk3.wav");
        write_artifact(&dir, "chunk3.wav.json", "{\"segments\": 3}\n").await;

        let text = collect_transcript(&chunk).await.unwrap();
        assert_eq!(text, "{\"segments\": 3}");
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let chunk = dir.path().join("chunk4.wav");
        let artifact = write_artifact(&dir, "chunk4.wav.json", "not json {{{").await;

        let err = collect_transcript(&chunk).await.unwrap_err();
        assert!(matches!(err, TranscribeError::Parse(_)));
        assert!(artifact.exists(), "unreadable artifact should be left in place");
    }

    #[tokio::test]
    async fn test_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let chunk = dir.path().join("chunk5.wav");

        let err = collect_transcript(&chunk).await.unwrap_err();
        assert!(matches!(err, TranscribeError::ArtifactMissing(_)));
    }

    #[tokio::test]
    async fn test_legacy_txt_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let chunk = dir.path().join("chunk6.wav");
        let artifact = write_artifact(&dir, "chunk6.wav.txt", "plain transcript\n").await;

        let text = collect_transcript(&chunk).await.unwrap();
        assert_eq!(text, "plain transcript");
        assert!(!artifact.exists());
    }

    #[test]
    fn test_artifact_path_appends_suffix() {
        let path = artifact_path(Path::new("/uploads/chunk.wav"), "json");
        assert_eq!(path, PathBuf::from("/uploads/chunk.wav.json"));
    }
}
