//! Interactive API documentation served next to the catalog routes.

use axum::{
    http::header::CONTENT_TYPE,
    response::{Html, IntoResponse},
};

use crate::templates;

/// OpenAPI 3 description of the catalog endpoints.
pub const OPENAPI_DOCUMENT: &str = include_str!("openapi.json");

pub const OPENAPI_PATH: &str = "/docs/openapi.json";

pub async fn openapi() -> impl IntoResponse {
    ([(CONTENT_TYPE, "application/json")], OPENAPI_DOCUMENT)
}

pub async fn swagger_ui() -> Html<String> {
    Html(templates::api_docs_page(OPENAPI_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_covers_every_endpoint() {
        let doc: serde_json::Value = serde_json::from_str(OPENAPI_DOCUMENT).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        for path in ["/auth/login", "/auth/refresh", "/movies", "/tvshows/{id}/episodes/{episodeId}"] {
            assert!(paths.contains_key(path), "{path} undocumented");
        }
        assert!(doc["paths"]["/movies"]["get"].is_object());
        assert!(doc["paths"]["/movies"]["post"].is_object());
    }
}
