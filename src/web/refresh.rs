use axum::http::StatusCode;

use crate::{
    models::AccessToken,
    web::upstream::{Upstream, UpstreamError, UpstreamRequest, UpstreamResponse},
};

/// Tokens read from the browser's cookies.
#[derive(Clone, Copy, Debug, Default)]
pub struct Credentials<'a> {
    pub access: Option<&'a str>,
    pub refresh: Option<&'a str>,
}

#[derive(Debug)]
pub enum Exchange {
    /// The stored access token was accepted.
    Direct(UpstreamResponse),
    /// The call succeeded only after minting a new access token, which the
    /// caller must persist.
    Renewed { response: UpstreamResponse, access_token: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("session is no longer authorized")]
    Unauthorized,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Performs an authenticated call, refreshing the access token at most once.
///
/// A missing access token counts as a 401 without a network round trip. After
/// a 401 the refresh token is exchanged and the original call replayed once;
/// any failure along that path ends the session.
pub async fn call_with_refresh<U: Upstream>(
    upstream: &U,
    credentials: Credentials<'_>,
    request: &UpstreamRequest,
) -> Result<Exchange, ExchangeError> {
    if let Some(access) = credentials.access {
        let first = upstream.send(request, access).await?;
        if first.status != StatusCode::UNAUTHORIZED {
            return Ok(Exchange::Direct(first));
        }
    }

    let Some(refresh_token) = credentials.refresh else {
        tracing::debug!(path = %request.path, "no refresh token, session ended");
        return Err(ExchangeError::Unauthorized);
    };

    let refreshed = match upstream.refresh(refresh_token).await {
        Ok(resp) => resp,
        Err(err) => {
            tracing::warn!(error = %err, "refresh call failed");
            return Err(ExchangeError::Unauthorized);
        }
    };
    let Some(access_token) = issued_token(&refreshed) else {
        tracing::debug!(status = %refreshed.status, "refresh rejected");
        return Err(ExchangeError::Unauthorized);
    };

    let retried = upstream.send(request, &access_token).await?;
    if retried.status == StatusCode::UNAUTHORIZED {
        return Err(ExchangeError::Unauthorized);
    }

    Ok(Exchange::Renewed { response: retried, access_token })
}

/// Access token carried by a successful refresh response.
pub fn issued_token(response: &UpstreamResponse) -> Option<String> {
    if !response.status.is_success() {
        return None;
    }
    response
        .envelope::<AccessToken>()
        .and_then(|e| e.data)
        .map(|d| d.token)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn issued_token_needs_success_status() {
        let body = json!({ "success": true, "data": { "token": "t" }, "message": "" });
        let ok = UpstreamResponse::json(StatusCode::OK, body.clone());
        let denied = UpstreamResponse::json(StatusCode::UNAUTHORIZED, body);
        assert_eq!(issued_token(&ok).as_deref(), Some("t"));
        assert_eq!(issued_token(&denied), None);
    }

    #[test]
    fn issued_token_ignores_missing_data() {
        let resp = UpstreamResponse::json(
            StatusCode::OK,
            json!({ "success": true, "data": null, "message": "" }),
        );
        assert_eq!(issued_token(&resp), None);
    }
}
