use std::sync::Arc;

use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod error;
mod tts;

use api::routes::{create_router, AppState};
use config::Config;
use tts::{ElevenLabsClient, TtsService};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().expect("Invalid configuration");
    let addr = config.socket_addr().expect("Invalid address");

    tracing::info!("ElevenLabs TTS Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Starting server on http://{}", addr);

    if config.api_key.is_none() {
        tracing::warn!("ELEVENLABS_API_KEY is not set; /api/tts will fail until it is");
    }

    // Provider client is built once and shared by every request
    let provider = Arc::new(ElevenLabsClient::from_config(&config));
    let tts = TtsService::new(provider, config.voice_id.clone());
    tracing::info!("Voice: {}", tts.voice_id());

    let state = Arc::new(AppState {
        tts,
        platform: config.platform.clone(),
    });

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
