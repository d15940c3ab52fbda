use std::path::PathBuf;

use sea_orm_migration::prelude::*;

use crate::seed;

/// Environment variable naming the directory holding the CSV seed files.
pub const SEED_DIR_ENV: &str = "CATALOG_SEED_DIR";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let Some(dir) = seed_dir() else {
            return Ok(());
        };

        let report = seed::load_dir(manager.get_connection(), &dir).await?;
        tracing::info!(dir = %dir.display(), ?report, "seeded catalog");
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let Some(dir) = seed_dir() else {
            return Ok(());
        };

        seed::unload_dir(manager.get_connection(), &dir).await
    }
}

fn seed_dir() -> Option<PathBuf> {
    let Ok(dir) = std::env::var(SEED_DIR_ENV) else {
        tracing::info!("{SEED_DIR_ENV} not set, skipping catalog seed");
        return None;
    };
    let dir = PathBuf::from(dir);
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "seed directory missing, skipping catalog seed");
        return None;
    }
    Some(dir)
}
