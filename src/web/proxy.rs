//! `/api/*` routes: the browser-facing JSON surface. Tokens never leave the
//! server; the browser only ever holds them as httpOnly cookies.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    models::{Envelope, TokenPair},
    web::{
        WebState,
        refresh::{Exchange, ExchangeError, call_with_refresh, issued_token},
        session::{self, StoredTokens},
        upstream::{Upstream, UpstreamRequest},
    },
};

pub async fn login(State(state): State<Arc<WebState>>, jar: CookieJar, body: String) -> Response {
    let resp = match state.upstream.login(body).await {
        Ok(resp) => resp,
        Err(err) => return unavailable(err),
    };

    let pair = resp
        .envelope::<TokenPair>()
        .filter(|_| resp.status.is_success())
        .and_then(|e| e.data);
    match pair {
        Some(pair) => {
            let jar = session::store_pair(jar, &state.config, &pair.token, &pair.refresh_token);
            (jar, StatusCode::NO_CONTENT).into_response()
        }
        None => (session::clear(jar, &state.config), resp.relay_or("Login failed")).into_response(),
    }
}

pub async fn refresh(State(state): State<Arc<WebState>>, jar: CookieJar) -> Response {
    let Some(refresh_token) = StoredTokens::read(&jar, &state.config).refresh else {
        return (session::clear(jar, &state.config), unauthorized("Missing refresh token"))
            .into_response();
    };

    let resp = match state.upstream.refresh(&refresh_token).await {
        Ok(resp) => resp,
        Err(err) => return unavailable(err),
    };
    match issued_token(&resp) {
        Some(token) => {
            (session::store_access(jar, &state.config, &token), StatusCode::NO_CONTENT)
                .into_response()
        }
        None => (session::clear(jar, &state.config), resp.relay_or("Unable to refresh token"))
            .into_response(),
    }
}

pub async fn logout(State(state): State<Arc<WebState>>, jar: CookieJar) -> Response {
    (session::clear(jar, &state.config), StatusCode::NO_CONTENT).into_response()
}

pub async fn list_movies(
    State(state): State<Arc<WebState>>,
    jar: CookieJar,
    RawQuery(query): RawQuery,
) -> Response {
    let path = match query.filter(|q| !q.is_empty()) {
        Some(q) => format!("/movies?{q}"),
        None => "/movies".to_string(),
    };
    forward(&state, jar, UpstreamRequest::get(path)).await
}

pub async fn create_movie(
    State(state): State<Arc<WebState>>,
    jar: CookieJar,
    body: String,
) -> Response {
    forward(&state, jar, UpstreamRequest::post_json("/movies", body)).await
}

pub async fn get_episode(
    State(state): State<Arc<WebState>>,
    jar: CookieJar,
    Path((show_id, episode_id)): Path<(String, String)>,
) -> Response {
    let path = format!(
        "/tvshows/{}/episodes/{}",
        urlencoding::encode(&show_id),
        urlencoding::encode(&episode_id)
    );
    forward(&state, jar, UpstreamRequest::get(path)).await
}

async fn forward(state: &WebState, jar: CookieJar, request: UpstreamRequest) -> Response {
    let tokens = StoredTokens::read(&jar, &state.config);
    match call_with_refresh(&state.upstream, tokens.credentials(), &request).await {
        Ok(Exchange::Direct(resp)) => resp.into_response(),
        Ok(Exchange::Renewed { response, access_token }) => {
            (session::store_access(jar, &state.config, &access_token), response).into_response()
        }
        Err(ExchangeError::Unauthorized) => {
            (session::clear(jar, &state.config), unauthorized("Unauthorized")).into_response()
        }
        Err(ExchangeError::Upstream(err)) => unavailable(err),
    }
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(Envelope::<()>::fail(message))).into_response()
}

fn unavailable(err: impl std::fmt::Display) -> Response {
    tracing::warn!(error = %err, "catalog API unreachable");
    (StatusCode::BAD_GATEWAY, Json(Envelope::<()>::fail("Catalog API unavailable"))).into_response()
}
