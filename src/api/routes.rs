use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::tts::TtsService;

pub struct AppState {
    pub tts: TtsService,
    /// Reported by the health endpoint.
    pub platform: String,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route(
            "/tts",
            get(handlers::tts)
                .head(handlers::method_not_allowed)
                .fallback(handlers::method_not_allowed),
        )
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
