//! HTTP adapters - REST API implementations.

pub mod survey;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

pub use survey::{survey_routes, SurveyAppState};

/// Full application router with tracing, timeout and CORS layers.
///
/// Origins that fail to parse are skipped with a warning.
pub fn app_router(state: SurveyAppState, server: &ServerConfig) -> Router {
    survey_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(cors_layer(server))
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if server.cors_allows_any() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<http::HeaderValue> = server
        .cors_origins_list()
        .into_iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}
