use std::path::Path;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers::{health_handler, languages_handler, transcribe_handler};
use crate::state::AppState;

/// Build the application router.
///
/// `frontend` is the prebuilt UI directory; when `None`, `/` and `/assets`
/// are not routed at all.
pub fn create_router(state: AppState, frontend: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let mut router = Router::new()
        .route("/transcribe", post(transcribe_handler))
        .route("/health", get(health_handler))
        .route("/languages", get(languages_handler));

    if let Some(dir) = frontend {
        tracing::info!(dir = %dir.display(), "serving frontend");
        router = router
            .route_service("/", ServeFile::new(dir.join("index.html")))
            .nest_service("/assets", ServeDir::new(dir.join("assets")));
    }

    router.layer(trace_layer).layer(cors).with_state(state)
}
