pub mod elevenlabs;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::{BoxStream, StreamExt};
use serde::Serialize;

use crate::error::SynthesisError;

pub use elevenlabs::ElevenLabsClient;

pub const MODEL_ID: &str = "eleven_multilingual_v2";

/// Tuned for generation speed over fidelity.
pub const VOICE_SETTINGS: VoiceSettings = VoiceSettings {
    stability: 0.6,
    similarity_boost: 0.7,
    style: 0.0,
    use_speaker_boost: false,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice_id: String,
    pub model_id: String,
    pub voice_settings: VoiceSettings,
}

/// Audio as handed back by a provider: already whole, or still arriving.
pub enum SynthesisResult {
    #[allow(dead_code)]
    Buffer(Bytes),
    ChunkStream(BoxStream<'static, Result<Bytes, SynthesisError>>),
}

impl SynthesisResult {
    /// Collapse into one contiguous buffer, keeping chunks in arrival order.
    pub async fn into_bytes(self) -> Result<Bytes, SynthesisError> {
        match self {
            SynthesisResult::Buffer(bytes) => Ok(bytes),
            SynthesisResult::ChunkStream(mut stream) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                Ok(buf.freeze())
            }
        }
    }
}

#[async_trait]
pub trait SpeechProvider: Send + Sync {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResult, SynthesisError>;
}

pub struct TtsService {
    provider: Arc<dyn SpeechProvider>,
    voice_id: String,
}

impl TtsService {
    pub fn new(provider: Arc<dyn SpeechProvider>, voice_id: String) -> Self {
        Self { provider, voice_id }
    }

    pub fn voice_id(&self) -> &str {
        &self.voice_id
    }

    pub async fn speak(&self, text: &str) -> Result<Bytes, SynthesisError> {
        let request = SynthesisRequest {
            text: text.to_string(),
            voice_id: self.voice_id.clone(),
            model_id: MODEL_ID.to_string(),
            voice_settings: VOICE_SETTINGS,
        };

        let result = self.provider.synthesize(request).await?;
        result.into_bytes().await
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeProvider;
    use super::*;

    #[tokio::test]
    async fn buffer_result_is_returned_unchanged() {
        let result = SynthesisResult::Buffer(Bytes::from_static(b"ID3audio"));
        assert_eq!(result.into_bytes().await.unwrap(), Bytes::from_static(b"ID3audio"));
    }

    #[tokio::test]
    async fn chunk_stream_is_concatenated_in_order() {
        let chunks: Vec<Result<Bytes, SynthesisError>> = vec![
            Ok(Bytes::from_static(b"b1")),
            Ok(Bytes::from_static(b"b2")),
            Ok(Bytes::from_static(b"b3")),
        ];
        let result = SynthesisResult::ChunkStream(futures::stream::iter(chunks).boxed());
        assert_eq!(result.into_bytes().await.unwrap(), Bytes::from_static(b"b1b2b3"));
    }

    #[tokio::test]
    async fn empty_chunk_stream_yields_empty_buffer() {
        let chunks: Vec<Result<Bytes, SynthesisError>> = Vec::new();
        let result = SynthesisResult::ChunkStream(futures::stream::iter(chunks).boxed());
        assert!(result.into_bytes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn error_mid_stream_aborts_assembly() {
        let chunks: Vec<Result<Bytes, SynthesisError>> = vec![
            Ok(Bytes::from_static(b"b1")),
            Err(SynthesisError::Provider {
                status: 500,
                message: "stream reset".to_string(),
            }),
            Ok(Bytes::from_static(b"b3")),
        ];
        let result = SynthesisResult::ChunkStream(futures::stream::iter(chunks).boxed());
        let err = result.into_bytes().await.unwrap_err();
        assert_eq!(err.to_string(), "stream reset");
    }

    #[tokio::test]
    async fn speak_sends_fixed_model_and_settings() {
        let provider = Arc::new(FakeProvider::buffer(b"mp3"));
        let service = TtsService::new(provider.clone(), "voice-abc".to_string());

        let audio = service.speak("Hello").await.unwrap();
        assert_eq!(audio, Bytes::from_static(b"mp3"));

        let request = provider.last_request().unwrap();
        assert_eq!(request.text, "Hello");
        assert_eq!(request.voice_id, "voice-abc");
        assert_eq!(request.model_id, "eleven_multilingual_v2");
        assert_eq!(request.voice_settings, VOICE_SETTINGS);
    }

    #[tokio::test]
    async fn speak_propagates_provider_errors() {
        let service = TtsService::new(
            Arc::new(FakeProvider::failing("quota exceeded")),
            "voice".to_string(),
        );
        let err = service.speak("Hello").await.unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");
    }
}
