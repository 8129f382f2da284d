// Copyright (c) 2025 - Cowboy AI, Inc.
//! Postgres-backed fabric repository
//!
//! Table `fabrics(code, name, measure_unit, offer_status, status, version)`.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};

use super::{previous_version, FabricRepository, RepositoryError};
use crate::db::{is_unique_violation, version_from_db, version_to_db};
use crate::domain::{Fabric, FabricCode, FabricDetails, FabricStatus};

/// Fabric repository over a shared connection pool
#[derive(Debug, Clone)]
pub struct PostgresFabricRepository {
    pool: PgPool,
}

impl PostgresFabricRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, code: &FabricCode, active_only: bool) -> Result<Fabric, RepositoryError> {
        let sql = if active_only {
            r#"
            SELECT code, name, measure_unit, offer_status, status, version
            FROM fabrics
            WHERE code = $1 AND status = 'ACTIVE'
            "#
        } else {
            r#"
            SELECT code, name, measure_unit, offer_status, status, version
            FROM fabrics
            WHERE code = $1
            "#
        };

        let row = sqlx::query(sql)
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_fabric", e))?;

        match row {
            Some(row) => fabric_from_row(&row),
            None => Err(RepositoryError::NotFound(code.clone())),
        }
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(format!("{} failed: {}", operation, err))
}

fn db_version(version: u64) -> Result<i64, RepositoryError> {
    version_to_db(version).map_err(RepositoryError::Database)
}

fn fabric_from_row(row: &PgRow) -> Result<Fabric, RepositoryError> {
    let decode = |e: sqlx::Error| RepositoryError::Database(format!("failed to decode fabric row: {}", e));

    let code: String = row.try_get("code").map_err(decode)?;
    let status: String = row.try_get("status").map_err(decode)?;
    let version: i64 = row.try_get("version").map_err(decode)?;

    let code = FabricCode::new(code)
        .map_err(|e| RepositoryError::Database(format!("stored code is invalid: {}", e)))?;
    let status: FabricStatus = status
        .parse()
        .map_err(|e| RepositoryError::Database(format!("{}", e)))?;
    let details = FabricDetails::new(
        row.try_get::<String, _>("name").map_err(decode)?,
        row.try_get::<String, _>("measure_unit").map_err(decode)?,
        row.try_get::<String, _>("offer_status").map_err(decode)?,
    );
    let version = version_from_db(version).map_err(RepositoryError::Database)?;

    Ok(Fabric::restore(code, details, status, version))
}

#[async_trait]
impl FabricRepository for PostgresFabricRepository {
    #[instrument(skip(self, fabric), fields(code = %fabric.code()), err)]
    async fn save(&self, fabric: &Fabric) -> Result<Fabric, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        // Row lock serializes concurrent creators of the same code
        let existing = sqlx::query(
            r#"
            SELECT code, name, measure_unit, offer_status, status, version
            FROM fabrics
            WHERE code = $1
            FOR UPDATE
            "#,
        )
        .bind(fabric.code().as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("lock_fabric", e))?;

        let persisted = match existing {
            Some(row) => {
                let existing = fabric_from_row(&row)?;
                if existing.is_active() {
                    return Err(RepositoryError::DuplicateCode(fabric.code().clone()));
                }

                let previous = existing.version();
                let mut revived = existing;
                revived.reactivate(fabric.details(), previous)?;

                sqlx::query(
                    r#"
                    UPDATE fabrics
                    SET name = $1, measure_unit = $2, offer_status = $3,
                        status = $4, version = $5, updated_at = NOW()
                    WHERE code = $6 AND version = $7
                    "#,
                )
                .bind(revived.name())
                .bind(revived.measure_unit())
                .bind(revived.offer_status())
                .bind(revived.status().as_str())
                .bind(db_version(revived.version())?)
                .bind(revived.code().as_str())
                .bind(db_version(previous)?)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("reactivate_fabric", e))?;

                debug!(version = revived.version(), "Reactivated deleted fabric");
                revived
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO fabrics (code, name, measure_unit, offer_status, status, version)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(fabric.code().as_str())
                .bind(fabric.name())
                .bind(fabric.measure_unit())
                .bind(fabric.offer_status())
                .bind(fabric.status().as_str())
                .bind(db_version(fabric.version())?)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        RepositoryError::DuplicateCode(fabric.code().clone())
                    } else {
                        map_sqlx_error("insert_fabric", e)
                    }
                })?;

                fabric.clone()
            }
        };

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(persisted)
    }

    #[instrument(skip(self), fields(code = %code), err)]
    async fn get_active(&self, code: &FabricCode) -> Result<Fabric, RepositoryError> {
        self.fetch(code, true).await
    }

    #[instrument(skip(self), fields(code = %code), err)]
    async fn get_including_deleted(&self, code: &FabricCode) -> Result<Fabric, RepositoryError> {
        self.fetch(code, false).await
    }

    #[instrument(skip(self, fabric), fields(code = %fabric.code(), version = fabric.version()), err)]
    async fn update(&self, fabric: &Fabric) -> Result<(), RepositoryError> {
        let previous = previous_version(fabric)?;

        let result = sqlx::query(
            r#"
            UPDATE fabrics
            SET name = $1, measure_unit = $2, offer_status = $3,
                version = $4, updated_at = NOW()
            WHERE code = $5 AND version = $6 AND status = 'ACTIVE'
            "#,
        )
        .bind(fabric.name())
        .bind(fabric.measure_unit())
        .bind(fabric.offer_status())
        .bind(db_version(fabric.version())?)
        .bind(fabric.code().as_str())
        .bind(db_version(previous)?)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_fabric", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(fabric.code().clone()));
        }
        Ok(())
    }

    #[instrument(skip(self, fabric), fields(code = %fabric.code(), version = fabric.version()), err)]
    async fn delete(&self, fabric: &Fabric) -> Result<(), RepositoryError> {
        let previous = previous_version(fabric)?;

        let result = sqlx::query(
            r#"
            UPDATE fabrics
            SET status = 'DELETED', version = $1, updated_at = NOW()
            WHERE code = $2 AND version = $3 AND status = 'ACTIVE'
            "#,
        )
        .bind(db_version(fabric.version())?)
        .bind(fabric.code().as_str())
        .bind(db_version(previous)?)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete_fabric", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(fabric.code().clone()));
        }
        Ok(())
    }
}
