use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;
use uuid::Uuid;

/// Download one audio chunk into `dest_dir`, returning the saved path.
/// The stored name gets a random prefix so that identically named
/// chunks from different jobs cannot overwrite each other's artifacts.
pub async fn download_audio(url: &str, dest_dir: &Path) -> Result<PathBuf> {
    info!("Starting download from URL: {}", url);

    let filename = chunk_file_name(url)?;
    let dest_path = dest_dir.join(filename);

    if !dest_dir.exists() {
        fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create directory: {}", e))?;
    }

    let response = reqwest::get(url)
        .await
        .map_err(|e| anyhow::anyhow!("HTTP request failed: {}", e))?;

    if !response.status().is_success() {
        return Err(anyhow::anyhow!(
            "HTTP request failed with status: {}",
            response.status()
        ));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read response: {}", e))?;

    fs::write(&dest_path, bytes)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to write file: {}", e))?;

    info!("Download completed: {:?}", dest_path);
    Ok(dest_path)
}

fn chunk_file_name(url: &str) -> Result<String> {
    let last = url.split('/').last().unwrap_or("");
    let base = last.split(['?', '#']).next().unwrap_or("");
    if base.is_empty() {
        return Err(anyhow::anyhow!("Invalid URL: no filename found"));
    }
    let id = Uuid::new_v4().simple().to_string();
    Ok(format!("{}-{}", &id[..8], base))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_file_name_strips_query_and_fragment() {
        let name = chunk_file_name("https://cdn.example.com/audio/chunk1.wav?sig=abc#t=0").unwrap();
        assert!(name.ends_with("-chunk1.wav"));
        assert!(!name.contains('?'));
    }

    #[test]
    fn test_chunk_file_name_is_unique_per_call() {
        let a = chunk_file_name("https://cdn.example.com/chunk.wav").unwrap();
        let b = chunk_file_name("https://cdn.example.com/chunk.wav").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_chunk_file_name_rejects_directory_urls() {
        assert!(chunk_file_name("https://cdn.example.com/audio/").is_err());
    }
}
