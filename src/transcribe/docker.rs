use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::TranscribeError;
use super::result::collect_transcript;
use super::ChunkTranscriber;

/// Mount point the worker container sees the chunk directory under.
pub const CONTAINER_MOUNT: &str = "/media";

const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Clone)]
pub struct DockerConfig {
    /// Image used for disposable worker containers.
    pub image: String,
    /// Name of the long-lived worker container, when one is deployed.
    pub container: String,
    /// Model path as seen from inside the container.
    pub model: String,
    /// Thread count handed to the transcription binary.
    pub threads: usize,
}

impl DockerConfig {
    pub fn from_env() -> Self {
        Self {
            image: crate::WHISPER_IMAGE.clone(),
            container: crate::WHISPER_CONTAINER.clone(),
            model: crate::WHISPER_MODEL.clone(),
            threads: *crate::WHISPER_THREADS,
        }
    }
}

/// Drives one whisper.cpp invocation per chunk: prefer triggering the
/// long-lived worker container via `docker exec`, fall back to a
/// disposable `docker run` when it is not up.
pub struct DockerTranscriber {
    config: DockerConfig,
}

impl DockerTranscriber {
    pub fn new(config: DockerConfig) -> Self {
        Self { config }
    }

    /// Liveness probe for the named worker container. Any failure
    /// (docker missing, container unknown, inspect erroring) reads as
    /// "not running" and routes to the disposable path.
    async fn container_running(&self) -> bool {
        let output = Command::new("docker")
            .args(["inspect", "-f", "{{.State.Running}}"])
            .arg(&self.config.container)
            .stdin(Stdio::null())
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).trim() == "true"
            }
            _ => false,
        }
    }

    /// Spawn `docker` with `args`, streaming worker diagnostics into the
    /// log, and wait for exit. Diagnostic output is never parsed for
    /// control decisions; only the exit status matters.
    async fn run_docker(&self, args: Vec<String>) -> Result<(), TranscribeError> {
        debug!("docker {}", args.join(" "));

        let mut command = Command::new("docker");
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(TranscribeError::Spawn)?;

        let stderr_tail = match child.stderr.take() {
            Some(stderr) => tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                let mut tail: Vec<String> = Vec::new();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(target: "whisper", "{}", line);
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.remove(0);
                    }
                    tail.push(line);
                }
                tail.join("\n")
            }),
            None => tokio::spawn(async { String::new() }),
        };

        let status = child.wait().await?;
        let stderr = stderr_tail.await.unwrap_or_default();

        if !status.success() {
            return Err(TranscribeError::WorkerExit {
                code: status.code(),
                stderr,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ChunkTranscriber for DockerTranscriber {
    async fn transcribe_chunk(&self, chunk: &Path) -> Result<String, TranscribeError> {
        let file_name = chunk
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| TranscribeError::InvalidChunk(chunk.to_path_buf()))?;
        let media_path = format!("{}/{}", CONTAINER_MOUNT, file_name);
        let invocation = whisper_invocation(&self.config.model, &media_path, self.config.threads);

        if self.container_running().await {
            info!(
                "Worker container '{}' is running, triggering transcription for {}",
                self.config.container, file_name
            );
            self.run_docker(exec_args(&self.config.container, &invocation))
                .await?;
        } else {
            info!(
                "Worker container '{}' not running, launching a disposable container for {}",
                self.config.container, file_name
            );
            let parent = chunk
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .ok_or_else(|| TranscribeError::InvalidChunk(chunk.to_path_buf()))?;
            let host_dir = tokio::fs::canonicalize(parent).await?;
            let name = format!("whisper-job-{}", Uuid::new_v4());
            self.run_docker(run_args(
                &name,
                &to_docker_host_path(&host_dir),
                &self.config.image,
                &invocation,
            ))
            .await?;
        }

        collect_transcript(chunk).await
    }
}

/// Normalize a host directory path for the `-v` flag. Docker Desktop on
/// Windows misreads `C:/path` (the second colon looks like a mode
/// separator), so drive letters become the `/c/path` form; WSL `/mnt/`
/// prefixes are stripped the same way.
pub fn to_docker_host_path(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");

    if let Some(rest) = normalized.strip_prefix("/mnt/") {
        return format!("/{}", rest);
    }

    let bytes = normalized.as_bytes();
    if bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/' {
        let drive = (bytes[0] as char).to_ascii_lowercase();
        return format!("/{}{}", drive, &normalized[2..]);
    }

    normalized
}

/// The transcription binary invocation: model, input, thread count, and
/// JSON output named after the input file.
fn whisper_invocation(model: &str, media_path: &str, threads: usize) -> Vec<String> {
    vec![
        "whisper-cli".to_string(),
        "-m".to_string(),
        model.to_string(),
        "-f".to_string(),
        media_path.to_string(),
        "-t".to_string(),
        threads.to_string(),
        "-oj".to_string(),
        "-of".to_string(),
        media_path.to_string(),
    ]
}

fn exec_args(container: &str, invocation: &[String]) -> Vec<String> {
    let mut args = vec![
        "exec".to_string(),
        "-w".to_string(),
        CONTAINER_MOUNT.to_string(),
        container.to_string(),
    ];
    args.extend_from_slice(invocation);
    args
}

fn run_args(name: &str, host_dir: &str, image: &str, invocation: &[String]) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "--rm".to_string(),
        "--name".to_string(),
        name.to_string(),
        "-v".to_string(),
        format!("{}:{}", host_dir, CONTAINER_MOUNT),
        "-w".to_string(),
        CONTAINER_MOUNT.to_string(),
        image.to_string(),
    ];
    args.extend_from_slice(invocation);
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_drive_letter_is_rewritten() {
        let path = Path::new(r"C:\Users\dash\uploads");
        assert_eq!(to_docker_host_path(path), "/c/Users/dash/uploads");
    }

    #[test]
    fn test_wsl_mount_prefix_is_stripped() {
        let path = Path::new("/mnt/d/recordings");
        assert_eq!(to_docker_host_path(path), "/d/recordings");
    }

    #[test]
    fn test_posix_path_is_unchanged() {
        let path = Path::new("/srv/uploads");
        assert_eq!(to_docker_host_path(path), "/srv/uploads");
    }

    #[test]
    fn test_whisper_invocation_names_model_input_and_json_output() {
        let invocation = whisper_invocation("/models/ggml-base.en.bin", "/media/chunk.wav", 4);
        assert_eq!(
            invocation,
            vec![
                "whisper-cli",
                "-m",
                "/models/ggml-base.en.bin",
                "-f",
                "/media/chunk.wav",
                "-t",
                "4",
                "-oj",
                "-of",
                "/media/chunk.wav",
            ]
        );
    }

    #[test]
    fn test_exec_args_target_the_named_container() {
        let invocation = vec!["whisper-cli".to_string()];
        let args = exec_args("whisper", &invocation);
        assert_eq!(args, vec!["exec", "-w", "/media", "whisper", "whisper-cli"]);
    }

    #[test]
    fn test_run_args_mount_the_chunk_directory() {
        let invocation = vec!["whisper-cli".to_string()];
        let args = run_args("whisper-job-1", "/c/uploads", "whisper-watcher:latest", &invocation);
        assert_eq!(
            args,
            vec![
                "run",
                "--rm",
                "--name",
                "whisper-job-1",
                "-v",
                "/c/uploads:/media",
                "-w",
                "/media",
                "whisper-watcher:latest",
                "whisper-cli",
            ]
        );
    }
}
