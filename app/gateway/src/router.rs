//! HTTP routes.

use crate::{config::ServerConfig, error::ApiError, extract::Payload, state::AppState};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, header},
    response::IntoResponse,
    routing::{get, post},
};
use inference::{Backend, CaptionOutcome, SummaryOutcome, normalize};
use serde_json::{Value, json};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the gateway router.
pub fn router<B: Backend>(state: AppState<B>, server: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/summarize", post(summarize::<B>))
        .route("/caption", post(caption::<B>))
        .route("/tts", post(tts::<B>))
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(cors(&server.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed = origins.iter().filter_map(|origin| match origin.parse::<HeaderValue>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("ignoring invalid cors origin {origin:?}");
            None
        }
    });
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn index() -> Json<Value> {
    Json(json!({"message": "Hugging Face API Gateway Running 🚀"}))
}

async fn summarize<B: Backend>(
    State(state): State<AppState<B>>,
    Payload(payload): Payload,
) -> Result<Json<SummaryOutcome>, ApiError> {
    let request = normalize::summarize_request(&payload)?;
    Ok(Json(state.orchestrator.summarize(&request).await?))
}

async fn caption<B: Backend>(
    State(state): State<AppState<B>>,
    Payload(payload): Payload,
) -> Result<Json<CaptionOutcome>, ApiError> {
    let request = normalize::caption_request(&payload)?;
    Ok(Json(state.orchestrator.caption(request).await?))
}

async fn tts<B: Backend>(
    State(state): State<AppState<B>>,
    Payload(payload): Payload,
) -> Result<impl IntoResponse, ApiError> {
    let request = normalize::speech_request(&payload)?;
    let audio = state.orchestrator.speak(&request).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "audio/mpeg"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"output.mp3\""),
        ],
        audio,
    ))
}
