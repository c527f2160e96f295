use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;

use super::{HealthResponse, TtsQuery};
use crate::api::routes::AppState;
use crate::error::AppError;

pub const DEFAULT_TEXT: &str = "Hello from ElevenLabs!";
pub const SERVICE_NAME: &str = "TTS Server";

pub async fn tts(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TtsQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query.map_err(|e| AppError::InvalidQuery(e.body_text()))?;
    let text = query
        .text
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TEXT.to_string());

    tracing::info!("Generating TTS for: {}", text);

    let audio = state.tts.speak(&text).await?;

    tracing::info!("Audio generated successfully, size: {} bytes", audio.len());

    // Headers chosen for Twilio <Play> compatibility
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/mpeg".to_string()),
            (header::CONTENT_LENGTH, audio.len().to_string()),
            (header::CACHE_CONTROL, "public, max-age=300".to_string()),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET".to_string()),
        ],
        audio,
    )
        .into_response())
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        service: SERVICE_NAME.to_string(),
        platform: state.platform.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
