pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod docs;
pub mod entities;
pub mod error;
pub mod models;
pub mod routes;
pub mod templates;
pub mod web;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{auth::TokenIssuer, catalog::Catalog};

pub struct AppState {
    pub catalog: Catalog,
    pub tokens: TokenIssuer,
}

/// Routes of the catalog API. Everything except the index, the docs and the
/// auth endpoints needs a valid bearer token.
pub fn api_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/movies", get(routes::list_movies).post(routes::create_movie))
        .route("/tvshows/{id}/episodes/{episode_id}", get(routes::get_episode))
        .route_layer(middleware::from_fn_with_state(state.clone(), routes::require_bearer));

    Router::new()
        .route("/", get(routes::index))
        .route("/auth/login", post(routes::login))
        .route("/auth/refresh", post(routes::refresh))
        .route("/docs", get(docs::swagger_ui))
        .route(docs::OPENAPI_PATH, get(docs::openapi))
        .merge(protected)
        .fallback(routes::not_found)
        .method_not_allowed_fallback(routes::method_not_allowed)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any).allow_methods(Any)),
        )
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutting down");
}
