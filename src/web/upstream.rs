use std::future::Future;

use axum::{
    body::Bytes,
    http::{HeaderValue, Method, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::models::Envelope;

/// A call to the catalog API, minus credentials.
#[derive(Clone, Debug)]
pub struct UpstreamRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<String>,
}

impl UpstreamRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: Method::GET, path: path.into(), body: None }
    }

    pub fn post_json(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self { method: Method::POST, path: path.into(), body: Some(body.into()) }
    }
}

/// What the catalog API answered, kept verbatim so it can be relayed.
#[derive(Clone, Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn json(status: StatusCode, body: serde_json::Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: Bytes::from(body.to_string()),
        }
    }

    pub fn envelope<T: DeserializeOwned>(&self) -> Option<Envelope<T>> {
        serde_json::from_slice(&self.body).ok()
    }

    /// Envelope message, or `fallback` when the body is not an envelope.
    pub fn message_or(&self, fallback: &str) -> String {
        self.envelope::<serde_json::Value>()
            .map(|e| e.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Relays the response, substituting a failure envelope for an empty body.
    pub fn relay_or(self, fallback: &str) -> Response {
        if self.body.is_empty() {
            return (self.status, axum::Json(Envelope::<()>::fail(fallback))).into_response();
        }
        self.into_response()
    }
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        let mut resp = (self.status, self.body).into_response();
        if let Some(value) = self.content_type.and_then(|ct| HeaderValue::from_str(&ct).ok()) {
            resp.headers_mut().insert(CONTENT_TYPE, value);
        }
        resp
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("catalog API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The two calls the session protocol needs from the catalog API.
pub trait Upstream: Sync {
    fn send(
        &self,
        request: &UpstreamRequest,
        access_token: &str,
    ) -> impl Future<Output = Result<UpstreamResponse, UpstreamError>> + Send;

    fn refresh(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<UpstreamResponse, UpstreamError>> + Send;
}

#[derive(Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUpstream {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub async fn login(&self, body: String) -> Result<UpstreamResponse, UpstreamError> {
        let req = self
            .client
            .post(self.url("/auth/login"))
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        execute(req).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Upstream for HttpUpstream {
    async fn send(
        &self,
        request: &UpstreamRequest,
        access_token: &str,
    ) -> Result<UpstreamResponse, UpstreamError> {
        tracing::debug!(method = %request.method, path = %request.path, "forwarding to catalog API");

        let mut req = self
            .client
            .request(request.method.clone(), self.url(&request.path))
            .bearer_auth(access_token);
        if let Some(body) = &request.body {
            req = req.header(CONTENT_TYPE, "application/json").body(body.clone());
        }
        execute(req).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<UpstreamResponse, UpstreamError> {
        tracing::debug!("refreshing access token");

        let req = self
            .client
            .post(self.url("/auth/refresh"))
            .json(&json!({ "refreshToken": refresh_token }));
        execute(req).await
    }
}

async fn execute(req: reqwest::RequestBuilder) -> Result<UpstreamResponse, UpstreamError> {
    let resp = req.send().await?;
    let status = resp.status();
    let content_type =
        resp.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).map(str::to_string);
    let body = resp.bytes().await?;
    Ok(UpstreamResponse { status, content_type, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_falls_back_when_body_is_not_an_envelope() {
        let resp = UpstreamResponse {
            status: StatusCode::BAD_GATEWAY,
            content_type: None,
            body: Bytes::from_static(b"<html>"),
        };
        assert_eq!(resp.message_or("Request failed"), "Request failed");
    }

    #[test]
    fn message_reads_the_envelope() {
        let resp = UpstreamResponse::json(
            StatusCode::NOT_FOUND,
            json!({ "success": false, "data": null, "message": "Director not found" }),
        );
        assert_eq!(resp.message_or("Request failed"), "Director not found");
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let up = HttpUpstream::new(reqwest::Client::new(), "http://api:3000/");
        assert_eq!(up.url("/movies"), "http://api:3000/movies");
    }
}
