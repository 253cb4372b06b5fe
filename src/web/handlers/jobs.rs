use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use super::ApiResponse;
use crate::jobs::Job;
use crate::synthesis::MinutesOptions;
use crate::utils::http::download_audio;
use crate::AppContext;

pub fn jobs_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/minutes", post(create_minutes_job))
        .route("/:job_id", get(get_job).delete(delete_job))
        .with_state(ctx)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinutesRequest {
    pub chunk_urls: Vec<String>,
    #[serde(flatten)]
    pub options: MinutesOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobCreated {
    job_id: String,
}

async fn create_minutes_job(
    State(ctx): State<Arc<AppContext>>,
    Json(req): Json<MinutesRequest>,
) -> impl IntoResponse {
    if req.chunk_urls.is_empty() {
        let response = ApiResponse::<JobCreated>::error("No audio chunks provided".to_string());
        return (StatusCode::BAD_REQUEST, Json(response)).into_response();
    }

    let upload_dir = PathBuf::from(crate::UPLOAD_DIR.as_str());
    let mut chunks = Vec::with_capacity(req.chunk_urls.len());
    for url in &req.chunk_urls {
        match download_audio(url, &upload_dir).await {
            Ok(path) => chunks.push(path),
            Err(e) => {
                error!("Failed to download audio chunk: {}", e);
                let response =
                    ApiResponse::<JobCreated>::error(format!("Failed to download audio: {}", e));
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response();
            }
        }
    }

    let job_id = ctx.store.create().await;
    let execution = {
        let pipeline = ctx.pipeline.clone();
        let job_id = job_id.clone();
        let options = req.options.clone();
        async move {
            pipeline.run(&job_id, chunks, options).await;
        }
    };
    ctx.scheduler.enqueue(job_id.clone(), execution).await;

    info!("Job {} queued with {} chunks", job_id, req.chunk_urls.len());
    let response = ApiResponse::success(JobCreated { job_id });
    (StatusCode::ACCEPTED, Json(response)).into_response()
}

async fn get_job(
    State(ctx): State<Arc<AppContext>>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    match ctx.store.get(&job_id).await {
        Some(job) => (StatusCode::OK, Json(ApiResponse::success(job))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<Job>::error("Job not found".to_string())),
        )
            .into_response(),
    }
}

async fn delete_job(
    State(ctx): State<Arc<AppContext>>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    ctx.store.delete(&job_id).await;
    (StatusCode::OK, Json(ApiResponse::<()>::success(()))).into_response()
}
