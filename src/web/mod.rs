//! Browser-facing edge: server-rendered pages plus a JSON proxy, both talking
//! to the catalog API on the browser's behalf with cookie-held tokens.

pub mod pages;
pub mod proxy;
pub mod refresh;
pub mod session;
pub mod upstream;

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use tower_http::trace::TraceLayer;

use crate::{config::WebConfig, web::session::StoredTokens};

pub use upstream::HttpUpstream;

pub struct WebState {
    pub config: Arc<WebConfig>,
    pub upstream: HttpUpstream,
}

impl WebState {
    pub fn new(config: WebConfig, client: reqwest::Client) -> Self {
        let upstream = HttpUpstream::new(client, config.api_base_url.clone());
        Self { config: Arc::new(config), upstream }
    }
}

pub fn router(state: Arc<WebState>) -> Router {
    Router::new()
        .route("/", get(pages::dashboard))
        .route("/login", get(pages::login_form).post(pages::login))
        .route("/logout", post(pages::logout))
        .route("/movies", get(pages::movies))
        .route("/movies/new", get(pages::new_movie_form).post(pages::create_movie))
        .route("/tvshows/{id}/episodes/{episode_id}", get(pages::episode))
        .route("/api/auth/login", post(proxy::login))
        .route("/api/auth/refresh", post(proxy::refresh))
        .route("/api/auth/logout", post(proxy::logout))
        .route("/api/movies", get(proxy::list_movies).post(proxy::create_movie))
        .route("/api/tvshows/{id}/episodes/{episode_id}", get(proxy::get_episode))
        .layer(middleware::from_fn_with_state(state.clone(), require_session))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Sends visitors without any session cookie to the login page. Only cookie
/// presence is checked here; validity is settled by the API.
pub async fn require_session(
    State(state): State<Arc<WebState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if is_public(&path) || !StoredTokens::read(&jar, &state.config).is_empty() {
        return next.run(request).await;
    }

    tracing::debug!(path = %path, "no session, redirecting to login");
    Redirect::temporary(&login_url(&path)).into_response()
}

pub fn is_public(path: &str) -> bool {
    path == "/login"
        || path.starts_with("/api/")
        || path.starts_with("/static/")
        || path.ends_with(".ico")
        || path.ends_with(".png")
}

pub fn login_url(from: &str) -> String {
    format!("/login?from={}", urlencoding::encode(from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_paths() {
        for path in ["/login", "/api/movies", "/api/auth/login", "/static/app.css", "/favicon.ico", "/logo.png"] {
            assert!(is_public(path), "{path}");
        }
        for path in ["/", "/movies", "/movies/new", "/logout", "/login/extra", "/tvshows/1/episodes/2"] {
            assert!(!is_public(path), "{path}");
        }
    }

    #[test]
    fn login_url_encodes_the_return_path() {
        assert_eq!(login_url("/movies"), "/login?from=%2Fmovies");
    }
}
