//! Assembles the Axum [`Router`] for the annotation endpoints.

use std::sync::Arc;

use axum::{
    http::{header, HeaderName},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::NodeConfig,
    handlers::{annotations, AppState},
    storage::Storage,
};

/// Headers browsers may read from cross-origin responses.
const EXPOSED_HEADERS: [HeaderName; 8] = [
    header::ETAG,
    header::LINK,
    header::ALLOW,
    header::VARY,
    header::CONTENT_LENGTH,
    header::CONTENT_LOCATION,
    HeaderName::from_static("accept-post"),
    header::LOCATION,
];

/// Build the complete application router with shared state.
///
/// Container paths are routed with and without a trailing slash, because
/// minted container IRIs end in `/`.
pub fn build_router(storage: Arc<dyn Storage>, config: NodeConfig) -> Router {
    let state = AppState { storage, config };

    Router::new()
        .route("/w3c/annotation", post(annotations::create_container))
        .route("/w3c/annotation/", post(annotations::create_container))
        .route(
            "/w3c/annotation/{container}",
            get(annotations::get_container).post(annotations::append_annotation),
        )
        .route(
            "/w3c/annotation/{container}/",
            get(annotations::get_container).post(annotations::append_annotation),
        )
        .route(
            "/w3c/annotation/{container}/{annotation}",
            get(annotations::get_annotation).put(annotations::update_annotation),
        )
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// Credentialed CORS: origin, methods and request headers are mirrored back.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_credentials(true)
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .expose_headers(EXPOSED_HEADERS)
}
