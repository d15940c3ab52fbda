use std::{sync::Arc, time::Duration};

use marquee::{
    config::WebConfig,
    shutdown_signal,
    web::{self, WebState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,marquee=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = WebConfig::from_env()?;
    let addr = config.addr;

    let http = reqwest::Client::builder()
        .user_agent("marquee-web/0.1")
        .timeout(Duration::from_secs(30))
        .build()?;

    tracing::info!(api = %config.api_base_url, "proxying catalog API");
    let app = web::router(Arc::new(WebState::new(config, http)));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "web frontend listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}
