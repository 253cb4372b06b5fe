pub mod jobs;
pub mod synthesis;
pub mod transcribe;
pub mod utils;
pub mod web;

use std::{env, sync::Arc};

use jobs::{JobStore, MinutesPipeline, Scheduler};
use once_cell::sync::Lazy;
use synthesis::Synthesizer;

pub struct AppContext {
    pub store: Arc<JobStore>,
    pub scheduler: Arc<Scheduler>,
    pub pipeline: Arc<MinutesPipeline>,
    pub synthesizer: Arc<dyn Synthesizer>,
}

const DEFAULT_MAX_CONCURRENT_JOBS: usize = 2;
const DEFAULT_WHISPER_IMAGE: &str = "whisper-watcher:latest";
// Stale .env files may still carry the retired image name.
const LEGACY_WHISPER_IMAGE: &str = "whisper-cpp:latest";
const DEFAULT_WHISPER_CONTAINER: &str = "whisper";
const DEFAULT_WHISPER_MODEL: &str = "/models/ggml-base.en.bin";
const DEFAULT_WHISPER_THREADS: usize = 4;
const DEFAULT_UPLOAD_DIR: &str = "./uploads";
const DEFAULT_PORT: u16 = 5001;

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().or_else(|| dotenv::var(key).ok())
}

pub static MAX_CONCURRENT_JOBS: Lazy<usize> = Lazy::new(|| {
    env_value("MAX_CONCURRENT_JOBS")
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_MAX_CONCURRENT_JOBS)
});

pub static WHISPER_IMAGE: Lazy<String> = Lazy::new(|| {
    match env_value("WHISPER_DOCKER_IMAGE") {
        Some(image) if image != LEGACY_WHISPER_IMAGE => image,
        _ => DEFAULT_WHISPER_IMAGE.to_string(),
    }
});

pub static WHISPER_CONTAINER: Lazy<String> = Lazy::new(|| {
    env_value("WHISPER_CONTAINER").unwrap_or_else(|| DEFAULT_WHISPER_CONTAINER.to_string())
});

pub static WHISPER_MODEL: Lazy<String> = Lazy::new(|| {
    env_value("WHISPER_MODEL").unwrap_or_else(|| DEFAULT_WHISPER_MODEL.to_string())
});

pub static WHISPER_THREADS: Lazy<usize> = Lazy::new(|| {
    env_value("WHISPER_THREADS")
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_WHISPER_THREADS)
});

pub static UPLOAD_DIR: Lazy<String> =
    Lazy::new(|| env_value("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()));

pub static HF_API_KEY: Lazy<String> = Lazy::new(|| env_value("HF_API_KEY").unwrap_or_default());

pub static MINUTES_PORT: Lazy<u16> = Lazy::new(|| {
    env_value("MINUTES_PORT")
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_PORT)
});

pub fn init_env() {
    dotenv::dotenv().ok();

    std::fs::create_dir_all(UPLOAD_DIR.as_str()).unwrap_or_else(|e| {
        eprintln!("Failed to create upload directory: {}", e);
    });
}
