use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;

/// Connection pool for the resume-metadata store. Pool size is a deployment
/// tunable like the extraction concurrency: one connection per in-flight
/// column update plus headroom for the indexer's candidate scans.
pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    info!(
        max_connections = config.db_max_connections,
        "connected to the resume metadata database"
    );
    Ok(pool)
}
