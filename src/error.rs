use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Failures while producing audio, from missing credentials through to a
/// broken response stream.
#[derive(thiserror::Error, Debug)]
pub enum SynthesisError {
    #[error("ELEVENLABS_API_KEY is not set")]
    MissingApiKey,

    #[error("Request to ElevenLabs failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Display is the provider's own message so callers see it verbatim.
    #[error("{message}")]
    Provider { status: u16, message: String },
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Audio generation failed: {0}")]
    Synthesis(#[from] SynthesisError),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", None)
            }
            AppError::InvalidQuery(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Audio generation failed",
                Some(msg.clone()),
            ),
            AppError::Synthesis(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Audio generation failed",
                Some(e.to_string()),
            ),
        };

        match &self {
            AppError::MethodNotAllowed => tracing::warn!("Request rejected: {}", self),
            AppError::InvalidQuery(msg) => tracing::error!("TTS error: invalid query: {}", msg),
            AppError::Synthesis(SynthesisError::Provider { status, message }) => {
                tracing::error!("TTS error: provider returned {}: {}", status, message)
            }
            AppError::Synthesis(e) => tracing::error!("TTS error: {:?}", e),
        }

        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}
