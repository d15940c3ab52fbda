use std::sync::Arc;

use axum::{
    Form,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::{EpisodeDetail, Movie, MovieSort, NewMovie, TokenPair},
    templates,
    web::{
        WebState, login_url,
        refresh::{Exchange, ExchangeError, call_with_refresh},
        session::{self, StoredTokens},
        upstream::{UpstreamRequest, UpstreamResponse},
    },
};

pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub from: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub from: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MoviesQuery {
    pub genre: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
}

/// Raw values of the new-movie form, echoed back when it is re-rendered.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MovieForm {
    pub title: String,
    pub genre: String,
    pub year: String,
    pub director_id: String,
    pub actor_ids: String,
}

impl MovieForm {
    pub fn validate(&self) -> Result<NewMovie, String> {
        let mut errors = Vec::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.push("Title is required");
        }
        let genre = self.genre.trim();
        if genre.is_empty() {
            errors.push("Genre is required");
        }

        let year = match self.year.trim() {
            "" => None,
            raw => match whole_number(raw) {
                Err(e) => {
                    errors.push(match e {
                        NumberError::NotANumber => "Year must be a number",
                        NumberError::Fractional => "Year must be an integer",
                    });
                    None
                }
                Ok(y) if y < 1900 => {
                    errors.push("Year must be after 1900");
                    None
                }
                Ok(y) if y > 2100 => {
                    errors.push("Year must be before 2100");
                    None
                }
                Ok(y) => Some(y),
            },
        };

        let director_id = match whole_number(self.director_id.trim()) {
            Ok(id) => Some(id),
            Err(NumberError::NotANumber) => {
                errors.push("Director is required");
                None
            }
            Err(NumberError::Fractional) => {
                errors.push("Director id must be an integer");
                None
            }
        };

        // unparseable segments are dropped, fractional ones rejected
        let mut actor_ids = Vec::new();
        for segment in self.actor_ids.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match whole_number(segment) {
                Ok(id) => actor_ids.push(id),
                Err(NumberError::NotANumber) => {}
                Err(NumberError::Fractional) => {
                    errors.push("Actor ids must be integers");
                    break;
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors.join(". "));
        }

        Ok(NewMovie {
            title: Some(title.to_string()),
            genre: Some(genre.to_string()),
            year,
            director_id,
            actor_ids: (!actor_ids.is_empty()).then_some(actor_ids),
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
enum NumberError {
    NotANumber,
    Fractional,
}

fn whole_number(raw: &str) -> Result<i32, NumberError> {
    if let Ok(n) = raw.parse::<i32>() {
        return Ok(n);
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() && n.fract() != 0.0 => Err(NumberError::Fractional),
        _ => Err(NumberError::NotANumber),
    }
}

/// One page of the movie table plus the filters that produced it.
#[derive(Debug)]
pub struct MovieListing {
    pub movies: Vec<Movie>,
    pub genre: String,
    pub sort: Option<MovieSort>,
    pub page: usize,
    pub total_pages: usize,
}

impl MovieListing {
    pub fn paginate(
        all: Vec<Movie>,
        genre: String,
        sort: Option<MovieSort>,
        requested: Option<&str>,
    ) -> Self {
        let total_pages = all.len().div_ceil(PAGE_SIZE).max(1);
        let page = requested
            .and_then(|p| p.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .clamp(1, total_pages);
        let movies = all.into_iter().skip((page - 1) * PAGE_SIZE).take(PAGE_SIZE).collect();
        Self { movies, genre, sort, page, total_pages }
    }

    pub fn page_href(&self, page: usize) -> String {
        let mut href = format!("/movies?page={page}");
        if !self.genre.is_empty() {
            href.push_str(&format!("&genre={}", urlencoding::encode(&self.genre)));
        }
        if let Some(sort) = self.sort {
            href.push_str(&format!("&sort={}", sort.as_str()));
        }
        href
    }
}

pub async fn login_form(query: Result<Query<LoginQuery>, QueryRejection>) -> Html<String> {
    let query = query_or_default(query);
    let from = query.from.as_deref().filter(|f| is_safe_return(f));
    Html(templates::login_page(from, None, ""))
}

pub async fn login(
    State(state): State<Arc<WebState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let from = form.from.as_deref().filter(|f| is_safe_return(f));
    let body = json!({ "username": form.username, "password": form.password }).to_string();

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
            tracing::info!(username = %form.username, "signed in");
            let jar = session::store_pair(jar, &state.config, &pair.token, &pair.refresh_token);
            (jar, Redirect::to(from.unwrap_or("/"))).into_response()
        }
        None => {
            let message = resp.message_or("Login failed");
            (resp.status, Html(templates::login_page(from, Some(&message), &form.username)))
                .into_response()
        }
    }
}

pub async fn logout(State(state): State<Arc<WebState>>, jar: CookieJar) -> Response {
    (session::clear(jar, &state.config), Redirect::to("/login")).into_response()
}

pub async fn dashboard(State(state): State<Arc<WebState>>) -> Html<String> {
    Html(templates::home_page(&format!("{}/docs", state.config.api_base_url.trim_end_matches('/'))))
}

pub async fn movies(
    State(state): State<Arc<WebState>>,
    jar: CookieJar,
    query: Result<Query<MoviesQuery>, QueryRejection>,
) -> Response {
    let query = query_or_default(query);
    let genre = query.genre.unwrap_or_default().trim().to_string();
    let sort = query.sort.as_deref().and_then(MovieSort::parse);

    let mut params = Vec::new();
    if !genre.is_empty() {
        params.push(format!("genre={}", urlencoding::encode(&genre)));
    }
    if let Some(sort) = sort {
        params.push(format!("sort={}", sort.as_str()));
    }
    let path = if params.is_empty() {
        "/movies".to_string()
    } else {
        format!("/movies?{}", params.join("&"))
    };

    let (jar, resp) = match fetch(&state, jar, UpstreamRequest::get(path), "/movies").await {
        Ok(done) => done,
        Err(resp) => return resp,
    };
    let Some(all) = resp.envelope::<Vec<Movie>>().filter(|_| resp.status.is_success()) else {
        return failed(jar, &resp, "Failed to load movies");
    };

    let listing =
        MovieListing::paginate(all.data.unwrap_or_default(), genre, sort, query.page.as_deref());
    (jar, Html(templates::movies_page(&listing))).into_response()
}

pub async fn new_movie_form() -> Html<String> {
    Html(templates::new_movie_page(&MovieForm::default(), None))
}

pub async fn create_movie(
    State(state): State<Arc<WebState>>,
    jar: CookieJar,
    Form(form): Form<MovieForm>,
) -> Response {
    let new = match form.validate() {
        Ok(new) => new,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Html(templates::new_movie_page(&form, Some(&message))))
                .into_response();
        }
    };
    let body = match serde_json::to_string(&new) {
        Ok(body) => body,
        Err(err) => {
            tracing::error!(error = %err, "failed to encode movie");
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(templates::error_page("Something went wrong.")))
                .into_response();
        }
    };

    let request = UpstreamRequest::post_json("/movies", body);
    let (jar, resp) = match fetch(&state, jar, request, "/movies/new").await {
        Ok(done) => done,
        Err(resp) => return resp,
    };

    if resp.status == StatusCode::CREATED {
        return (jar, Redirect::to("/movies")).into_response();
    }
    let message = resp.message_or("Failed to create movie");
    (resp.status, jar, Html(templates::new_movie_page(&form, Some(&message)))).into_response()
}

pub async fn episode(
    State(state): State<Arc<WebState>>,
    jar: CookieJar,
    Path((show_id, episode_id)): Path<(String, String)>,
) -> Response {
    let path = format!(
        "/tvshows/{}/episodes/{}",
        urlencoding::encode(&show_id),
        urlencoding::encode(&episode_id)
    );
    let (jar, resp) = match fetch(&state, jar, UpstreamRequest::get(path.clone()), &path).await {
        Ok(done) => done,
        Err(resp) => return resp,
    };

    match resp.envelope::<EpisodeDetail>().filter(|_| resp.status.is_success()).and_then(|e| e.data)
    {
        Some(episode) => (jar, Html(templates::episode_page(&episode))).into_response(),
        None => failed(jar, &resp, "Episode not found"),
    }
}

/// Runs an authenticated call for a page. On a terminal auth failure the
/// cookies are cleared and the browser sent to the login page, returning
/// to `return_to` afterwards.
async fn fetch(
    state: &WebState,
    jar: CookieJar,
    request: UpstreamRequest,
    return_to: &str,
) -> Result<(CookieJar, UpstreamResponse), Response> {
    let tokens = StoredTokens::read(&jar, &state.config);
    match call_with_refresh(&state.upstream, tokens.credentials(), &request).await {
        Ok(Exchange::Direct(resp)) => Ok((jar, resp)),
        Ok(Exchange::Renewed { response, access_token }) => {
            Ok((session::store_access(jar, &state.config, &access_token), response))
        }
        Err(ExchangeError::Unauthorized) => Err((
            session::clear(jar, &state.config),
            Redirect::to(&login_url(return_to)),
        )
            .into_response()),
        Err(ExchangeError::Upstream(err)) => Err(unavailable(err)),
    }
}

/// Pages render their defaults rather than a plain-text rejection when the
/// query string is malformed.
fn query_or_default<T: Default>(query: Result<Query<T>, QueryRejection>) -> T {
    match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "ignoring malformed query string");
            T::default()
        }
    }
}

/// Only same-site absolute paths are followed after login.
fn is_safe_return(from: &str) -> bool {
    from.starts_with('/') && !from.starts_with("//") && !from.starts_with("/\\")
}

fn failed(jar: CookieJar, resp: &UpstreamResponse, fallback: &str) -> Response {
    let status = if resp.status.is_success() { StatusCode::BAD_GATEWAY } else { resp.status };
    (status, jar, Html(templates::error_page(&resp.message_or(fallback)))).into_response()
}

fn unavailable(err: impl std::fmt::Display) -> Response {
    tracing::warn!(error = %err, "catalog API unreachable");
    (StatusCode::BAD_GATEWAY, Html(templates::error_page("The catalog API is unavailable.")))
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Director;

    fn form(title: &str, genre: &str, year: &str, director: &str, actors: &str) -> MovieForm {
        MovieForm {
            title: title.into(),
            genre: genre.into(),
            year: year.into(),
            director_id: director.into(),
            actor_ids: actors.into(),
        }
    }

    fn movies(n: i32) -> Vec<Movie> {
        (1..=n)
            .map(|id| Movie {
                id,
                title: format!("Movie {id}"),
                genre: "Drama".into(),
                year: 2000,
                director: Director { id: 1, name: "D".into() },
                actors: vec![],
            })
            .collect()
    }

    #[test]
    fn valid_form_becomes_a_request() {
        let new = form(" Heat ", "Crime", "1995", "2", "1, 3,x,").validate().unwrap();
        assert_eq!(new.title.as_deref(), Some("Heat"));
        assert_eq!(new.year, Some(1995));
        assert_eq!(new.director_id, Some(2));
        assert_eq!(new.actor_ids, Some(vec![1, 3]));
    }

    #[test]
    fn blank_year_and_cast_are_omitted() {
        let new = form("Heat", "Crime", "", "2", " ").validate().unwrap();
        assert_eq!(new.year, None);
        assert_eq!(new.actor_ids, None);
    }

    #[test]
    fn form_errors_are_reported_together() {
        let err = form("", "", "1850", "abc", "").validate().unwrap_err();
        assert!(err.contains("Title is required"));
        assert!(err.contains("Genre is required"));
        assert!(err.contains("Year must be after 1900"));
        assert!(err.contains("Director is required"));
    }

    #[test]
    fn year_must_be_whole_and_in_range() {
        assert!(form("a", "b", "2000.5", "1", "").validate().unwrap_err().contains("integer"));
        assert!(form("a", "b", "2101", "1", "").validate().unwrap_err().contains("before 2100"));
        assert!(form("a", "b", "soon", "1", "").validate().unwrap_err().contains("number"));
        assert_eq!(form("a", "b", "2100", "1", "").validate().unwrap().year, Some(2100));
    }

    #[test]
    fn pages_are_clamped() {
        let listing = MovieListing::paginate(movies(25), String::new(), None, Some("9"));
        assert_eq!(listing.total_pages, 3);
        assert_eq!(listing.page, 3);
        assert_eq!(listing.movies.len(), 5);
        assert_eq!(listing.movies[0].id, 21);

        let listing = MovieListing::paginate(movies(25), String::new(), None, Some("0"));
        assert_eq!(listing.page, 1);
        assert_eq!(listing.movies.len(), PAGE_SIZE);

        let listing = MovieListing::paginate(vec![], String::new(), None, Some("junk"));
        assert_eq!((listing.page, listing.total_pages), (1, 1));
    }

    #[test]
    fn page_links_keep_filters() {
        let listing =
            MovieListing::paginate(movies(3), "Sci Fi".into(), Some(MovieSort::Year), None);
        assert_eq!(listing.page_href(2), "/movies?page=2&genre=Sci%20Fi&sort=year");
    }

    #[test]
    fn return_paths_stay_on_site() {
        assert!(is_safe_return("/movies?page=2"));
        assert!(!is_safe_return("//evil.example"));
        assert!(!is_safe_return("/\\evil.example"));
        assert!(!is_safe_return("https://evil.example"));
    }
}
