use std::sync::Arc;

use marquee::{
    AppState, api_router, auth::TokenIssuer, catalog::Catalog, config::ApiConfig, db,
    shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,marquee=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = ApiConfig::from_env()?;

    let db = db::connect_and_migrate(&config.database_url).await?;
    let state = Arc::new(AppState {
        catalog: Catalog::new(db.clone()),
        tokens: TokenIssuer::from_config(&config),
    });

    let app = api_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "catalog API listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    db.close().await?;
    Ok(())
}
