use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    config::ApiConfig,
    error::{AppError, AppResult},
    models::TokenPair,
};

pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Id carried by every token; there is a single configured account.
const ADMIN_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies the access/refresh token pair.
///
/// Access and refresh tokens are signed with distinct secrets, so one can
/// never stand in for the other.
#[derive(Clone)]
pub struct TokenIssuer {
    admin_username: String,
    admin_password: String,
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl TokenIssuer {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        admin_username: impl Into<String>,
        admin_password: impl Into<String>,
    ) -> Self {
        Self {
            admin_username: admin_username.into(),
            admin_password: admin_password.into(),
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            &config.jwt_refresh_secret,
            config.admin_username.clone(),
            config.admin_password.clone(),
        )
    }

    pub fn login(&self, username: &str, password: &str) -> AppResult<TokenPair> {
        if username != self.admin_username || password != self.admin_password {
            tracing::debug!(username = %username, "rejected login");
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let now = now_sec();
        let token = sign(&self.access_encoding, ADMIN_ID, username, now, ACCESS_TOKEN_TTL_SECS)?;
        let refresh_token =
            sign(&self.refresh_encoding, ADMIN_ID, username, now, REFRESH_TOKEN_TTL_SECS)?;

        Ok(TokenPair { token, refresh_token })
    }

    /// Mints a new access token from a refresh token. The refresh token is the
    /// sole authority: its payload is trusted without consulting credentials.
    pub fn refresh(&self, refresh_token: &str) -> AppResult<String> {
        let claims = verify(&self.refresh_decoding, refresh_token).map_err(|err| {
            tracing::debug!(error = %err, "refresh token rejected");
            AppError::Unauthorized("Invalid or expired refresh token".to_string())
        })?;

        sign(&self.access_encoding, claims.id, &claims.username, now_sec(), ACCESS_TOKEN_TTL_SECS)
    }

    pub fn verify_access(&self, token: &str) -> AppResult<Claims> {
        verify(&self.access_decoding, token).map_err(|err| {
            tracing::debug!(error = %err, "access token rejected");
            AppError::Unauthorized("Unauthorized".to_string())
        })
    }

    pub fn verify_refresh(&self, token: &str) -> AppResult<Claims> {
        verify(&self.refresh_decoding, token)
            .map_err(|_| AppError::Unauthorized("Invalid or expired refresh token".to_string()))
    }

    /// Signs a refresh token with explicit timestamps.
    pub fn sign_refresh_at(&self, id: i32, username: &str, iat: i64, ttl: i64) -> AppResult<String> {
        sign(&self.refresh_encoding, id, username, iat, ttl)
    }

    /// Signs an access token with explicit timestamps.
    pub fn sign_access_at(&self, id: i32, username: &str, iat: i64, ttl: i64) -> AppResult<String> {
        sign(&self.access_encoding, id, username, iat, ttl)
    }
}

fn sign(key: &EncodingKey, id: i32, username: &str, iat: i64, ttl: i64) -> AppResult<String> {
    let claims = Claims { id, username: username.to_string(), iat, exp: iat + ttl };
    encode(&Header::default(), &claims, key).map_err(|e| AppError::Internal(e.into()))
}

fn verify(key: &DecodingKey, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.leeway = 0;
    Ok(decode::<Claims>(token, key, &validation)?.claims)
}

pub fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("secret-a", "secret-b", "admin", "password")
    }

    #[test]
    fn login_issues_tokens_signed_with_separate_secrets() {
        let auth = issuer();
        let pair = auth.login("admin", "password").unwrap();

        let access = auth.verify_access(&pair.token).unwrap();
        assert_eq!(access.id, 1);
        assert_eq!(access.username, "admin");
        assert_eq!(access.exp - access.iat, ACCESS_TOKEN_TTL_SECS);

        let refresh = auth.verify_refresh(&pair.refresh_token).unwrap();
        assert_eq!(refresh.id, 1);
        assert_eq!(refresh.exp - refresh.iat, REFRESH_TOKEN_TTL_SECS);

        assert!(auth.verify_access(&pair.refresh_token).is_err());
        assert!(auth.verify_refresh(&pair.token).is_err());
    }

    #[test]
    fn login_rejects_anything_but_the_exact_pair() {
        let auth = issuer();
        for (user, pass) in [("admin", "Password"), ("Admin", "password"), ("", ""), ("admin", "")]
        {
            let err = auth.login(user, pass).unwrap_err();
            assert!(matches!(err, AppError::Unauthorized(_)), "{user}/{pass}");
        }
    }

    #[test]
    fn refresh_rejects_access_tokens() {
        let auth = issuer();
        let pair = auth.login("admin", "password").unwrap();
        assert!(matches!(auth.refresh(&pair.token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn refresh_rejects_expired_tokens() {
        let auth = issuer();
        let expired = auth.sign_refresh_at(1, "admin", now_sec() - 7200, 3600).unwrap();
        assert!(matches!(auth.refresh(&expired), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn refresh_keeps_the_payload() {
        let auth = issuer();
        let pair = auth.login("admin", "password").unwrap();
        let access = auth.refresh(&pair.refresh_token).unwrap();
        let claims = auth.verify_access(&access).unwrap();
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.id, 1);
    }

    #[test]
    fn garbage_is_not_a_token() {
        assert!(issuer().verify_access("not-a-jwt").is_err());
    }
}
