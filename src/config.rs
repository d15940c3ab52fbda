use std::net::SocketAddr;

use anyhow::Context;

/// Settings for the catalog API process.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub addr: SocketAddr,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub admin_username: String,
    pub admin_password: String,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://marquee.db?mode=rwc".to_string());

        let jwt_secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| "my_jwt_secret".to_string());
        let jwt_refresh_secret = std::env::var("JWT_REFRESH_SECRET")
            .unwrap_or_else(|_| "my_refresh_secret".to_string());

        let admin_username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let admin_password =
            std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "password".to_string());

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            jwt_secret,
            jwt_refresh_secret,
            admin_username,
            admin_password,
        })
    }
}

/// Settings for the web frontend and its proxy routes.
#[derive(Clone, Debug)]
pub struct WebConfig {
    pub addr: SocketAddr,
    pub api_base_url: String,
    pub access_cookie: String,
    pub refresh_cookie: String,
    pub secure_cookies: bool,
}

impl WebConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = std::env::var("WEB_PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse()
            .context("WEB_PORT")?;

        let api_base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let access_cookie =
            std::env::var("AUTH_COOKIE_ACCESS").unwrap_or_else(|_| "access".to_string());
        let refresh_cookie =
            std::env::var("AUTH_COOKIE_REFRESH").unwrap_or_else(|_| "refresh".to_string());

        let secure_cookies =
            std::env::var("APP_ENV").map(|env| env == "production").unwrap_or(false);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("WEB_HOST/WEB_PORT")?,
            api_base_url,
            access_cookie,
            refresh_cookie,
            secure_cookies,
        })
    }

    /// Configuration used by tests and local tooling.
    pub fn local(api_base_url: impl Into<String>) -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            api_base_url: api_base_url.into(),
            access_cookie: "access".to_string(),
            refresh_cookie: "refresh".to_string(),
            secure_cookies: false,
        }
    }
}
