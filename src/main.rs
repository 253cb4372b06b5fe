#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use minutes_rs::{
    init_env,
    jobs::{JobStore, MinutesPipeline, Scheduler},
    synthesis::{HfSynthesizer, Synthesizer},
    transcribe::{DockerConfig, DockerTranscriber},
    utils::logger,
    web, AppContext, HF_API_KEY, MAX_CONCURRENT_JOBS, MINUTES_PORT,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = logger::init("./logs".to_string())?;
    init_env();

    info!("Starting minutes service...");

    let store = Arc::new(JobStore::new());
    let _sweeper = store.clone().spawn_sweeper();

    info!("Initializing Scheduler (limit {})...", *MAX_CONCURRENT_JOBS);
    let scheduler = Scheduler::new(*MAX_CONCURRENT_JOBS);

    let docker = DockerConfig::from_env();
    info!(
        "Transcription worker: container '{}', image '{}'",
        docker.container, docker.image
    );
    let transcriber = Arc::new(DockerTranscriber::new(docker));

    if HF_API_KEY.is_empty() {
        warn!("HF_API_KEY is not set; minutes synthesis will fail");
    }
    let synthesizer: Arc<dyn Synthesizer> = Arc::new(HfSynthesizer::new(HF_API_KEY.clone()));

    let pipeline = Arc::new(MinutesPipeline::new(
        store.clone(),
        transcriber,
        synthesizer.clone(),
    ));

    let ctx = Arc::new(AppContext {
        store,
        scheduler,
        pipeline,
        synthesizer,
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], *MINUTES_PORT));
    info!("Starting HTTP server at http://{}", addr);

    match web::start_server(ctx, addr).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            tracing::error!("Server error: {}", e);
            return Err(e);
        }
    }

    Ok(())
}
