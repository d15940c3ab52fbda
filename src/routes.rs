use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, Request, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{
        AccessToken, Envelope, EpisodeDetail, LoginRequest, Movie, MovieQuery, NewMovie,
        RefreshRequest, TokenPair,
    },
};

pub async fn index() -> &'static str {
    "Welcome to the Movies & TV Shows API"
}

pub async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<Envelope<TokenPair>>> {
    let Json(req) = payload.map_err(bad_body)?;
    let username = req.username.filter(|u| !u.is_empty());
    let password = req.password.filter(|p| !p.is_empty());
    let (Some(username), Some(password)) = (username, password) else {
        return Err(AppError::Validation("Username and password are required".to_string()));
    };

    let pair = state.tokens.login(&username, &password)?;
    tracing::info!(username = %username, "login succeeded");
    Ok(Json(Envelope::ok(pair, "Logged in successfully")))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> AppResult<Json<Envelope<AccessToken>>> {
    let Json(req) = payload.map_err(bad_body)?;
    let Some(refresh_token) = req.refresh_token.filter(|t| !t.is_empty()) else {
        return Err(AppError::Validation("Refresh token is required".to_string()));
    };

    let token = state.tokens.refresh(&refresh_token)?;
    Ok(Json(Envelope::ok(AccessToken { token }, "Token refreshed successfully")))
}

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    query: Result<Query<MovieQuery>, QueryRejection>,
) -> AppResult<Json<Envelope<Vec<Movie>>>> {
    let Query(query) = query.map_err(bad_query)?;
    let movies = state.catalog.list_movies(&query).await?;
    tracing::debug!(genre = ?query.genre, sort = ?query.sort, count = movies.len(), "listed movies");
    Ok(Json(Envelope::ok(movies, "Movies retrieved successfully")))
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewMovie>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Envelope<Movie>>)> {
    let Json(new) = payload.map_err(bad_body)?;
    let movie = state.catalog.create_movie(new).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(movie, "Movie created successfully"))))
}

pub async fn get_episode(
    State(state): State<Arc<AppState>>,
    Path((show_id, episode_id)): Path<(String, String)>,
) -> AppResult<Json<Envelope<EpisodeDetail>>> {
    let (Some(show_id), Some(episode_id)) = (positive_id(&show_id), positive_id(&episode_id))
    else {
        return Err(AppError::Validation("TV show ID and episode ID are required".to_string()));
    };

    let episode = state.catalog.get_episode(show_id, episode_id).await?;
    Ok(Json(Envelope::ok(episode, "Episode retrieved successfully")))
}

/// Rejects requests without a valid access token and exposes the verified
/// claims to downstream handlers as a request extension.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let claims = {
        let token = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;
        state.tokens.verify_access(token)?
    };

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn bad_body(rejection: JsonRejection) -> AppError {
    AppError::Validation(rejection.body_text())
}

fn bad_query(rejection: QueryRejection) -> AppError {
    AppError::Validation(rejection.body_text())
}

fn positive_id(raw: &str) -> Option<i32> {
    raw.trim().parse().ok().filter(|id: &i32| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_positive_integers() {
        assert_eq!(positive_id("7"), Some(7));
        assert_eq!(positive_id("0"), None);
        assert_eq!(positive_id("-3"), None);
        assert_eq!(positive_id("abc"), None);
        assert_eq!(positive_id(""), None);
        assert_eq!(positive_id("2147483648"), None);
    }
}
