use async_trait::async_trait;
use futures::stream::{StreamExt, TryStreamExt};
use reqwest::header::ACCEPT;
use serde::Serialize;
use serde_json::Value;

use super::{SpeechProvider, SynthesisRequest, SynthesisResult, VoiceSettings};
use crate::config::Config;
use crate::error::SynthesisError;

const API_KEY_HEADER: &str = "xi-api-key";

/// HTTP client for the ElevenLabs streaming text-to-speech endpoint.
pub struct ElevenLabsClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Serialize)]
struct TextToSpeechBody<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

impl ElevenLabsClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_key.clone(), config.base_url.clone())
    }

    fn endpoint(&self, voice_id: &str) -> String {
        format!("{}/v1/text-to-speech/{}/stream", self.base_url, voice_id)
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResult, SynthesisError> {
        let api_key = self.api_key.as_deref().ok_or(SynthesisError::MissingApiKey)?;

        let body = TextToSpeechBody {
            text: &request.text,
            model_id: &request.model_id,
            voice_settings: request.voice_settings,
        };

        tracing::debug!(
            "POST {} (model {}, {} chars)",
            self.endpoint(&request.voice_id),
            request.model_id,
            request.text.chars().count()
        );

        let response = self
            .http
            .post(self.endpoint(&request.voice_id))
            .header(API_KEY_HEADER, api_key)
            .header(ACCEPT, "audio/mpeg")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(&text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
            return Err(SynthesisError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let chunks = response.bytes_stream().map_err(SynthesisError::from).boxed();
        Ok(SynthesisResult::ChunkStream(chunks))
    }
}

/// Pull a readable message out of an ElevenLabs error body.
///
/// The API reports errors as `{"detail": {"status": .., "message": ..}}`,
/// though validation errors and proxies use other shapes. Falls back to the
/// raw body text when it is not JSON.
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return Some(body.to_string());
    };

    let found = match json.get("detail") {
        Some(Value::Object(detail)) => detail.get("message").and_then(Value::as_str),
        Some(Value::String(detail)) => Some(detail.as_str()),
        _ => None,
    }
    .or_else(|| json.get("message").and_then(Value::as_str));

    Some(found.map(str::to_string).unwrap_or_else(|| body.to_string()))
}
