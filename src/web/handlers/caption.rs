use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use super::ApiResponse;
use crate::synthesis::CaptionOptions;
use crate::AppContext;

pub fn caption_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/generate", post(generate_caption))
        .with_state(ctx)
}

#[derive(Debug, Serialize)]
struct CaptionResponse {
    caption: String,
}

// Captions are short enough to serve inline, without the job machinery.
async fn generate_caption(
    State(ctx): State<Arc<AppContext>>,
    Json(req): Json<CaptionOptions>,
) -> impl IntoResponse {
    match ctx.synthesizer.generate_caption(&req).await {
        Ok(caption) => (
            StatusCode::OK,
            Json(ApiResponse::success(CaptionResponse { caption })),
        )
            .into_response(),
        Err(e) => {
            error!("Caption generation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<CaptionResponse>::error(e.to_string())),
            )
                .into_response()
        }
    }
}
