// Copyright (c) 2025 - Cowboy AI, Inc.
//! Postgres connection pool and shared SQL helpers

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::PostgresConfig;
use crate::errors::{InfrastructureError, InfrastructureResult};

/// Postgres SQLSTATE for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// Open a connection pool and verify it answers
pub async fn connect(config: &PostgresConfig) -> InfrastructureResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .idle_timeout(config.idle_timeout)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.url)
        .await
        .map_err(|e| InfrastructureError::Database(format!("failed to connect: {}", e)))?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| InfrastructureError::Database(format!("ping failed: {}", e)))?;

    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Connected to Postgres"
    );

    Ok(pool)
}

/// True when the error is a unique constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == UNIQUE_VIOLATION;
        }
    }
    false
}

/// Versions are `u64` in the domain and `BIGINT` in storage
pub(crate) fn version_to_db(version: u64) -> Result<i64, String> {
    i64::try_from(version).map_err(|_| format!("version {} exceeds BIGINT range", version))
}

/// Envelope schema versions are `u32` on the wire and `INTEGER` in storage
pub(crate) fn event_version_to_db(version: u32) -> Result<i32, String> {
    i32::try_from(version).map_err(|_| format!("event version {} exceeds INTEGER range", version))
}

pub(crate) fn version_from_db(version: i64) -> Result<u64, String> {
    u64::try_from(version).map_err(|_| format!("stored version {} is negative", version))
}
