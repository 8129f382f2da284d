// Copyright (c) 2025 - Cowboy AI, Inc.
//! Postgres-backed event store
//!
//! Writes to the `events` table. The unique constraint on
//! `(aggregate_id, aggregate_version)` is the single source of truth for
//! duplicate and concurrent writes:
//!
//! | SQLx error | SQLSTATE | EventStoreError |
//! |------------|----------|-----------------|
//! | Database (unique violation) | `23505` | `ConcurrencyConflict` |
//! | Anything else | any | `Database` |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{EventStore, EventStoreError};
use crate::db::{event_version_to_db, is_unique_violation, version_from_db, version_to_db};
use crate::envelope::EventEnvelope;

/// Event store over a shared connection pool
#[derive(Debug, Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> EventStoreError {
    EventStoreError::Database(format!("{} failed: {}", operation, err))
}

#[async_trait]
impl EventStore for PostgresEventStore {
    #[instrument(skip(self, envelopes), fields(batch_size = envelopes.len()), err)]
    async fn append(&self, envelopes: &[EventEnvelope]) -> Result<(), EventStoreError> {
        if envelopes.is_empty() {
            return Ok(());
        }
        for envelope in envelopes {
            envelope.validate()?;
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        for envelope in envelopes {
            let version = version_to_db(envelope.aggregate_version).map_err(EventStoreError::Database)?;
            let event_version =
                event_version_to_db(envelope.event_version).map_err(EventStoreError::Serialization)?;

            sqlx::query(
                r#"
                INSERT INTO events (
                    event_id,
                    aggregate_id,
                    aggregate_type,
                    event_type,
                    aggregate_version,
                    event_version,
                    payload,
                    timestamp,
                    correlation_id,
                    causation_id,
                    user_id
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(envelope.event_id)
            .bind(&envelope.aggregate_id)
            .bind(&envelope.aggregate_type)
            .bind(&envelope.event_type)
            .bind(version)
            .bind(event_version)
            .bind(&envelope.payload)
            .bind(envelope.timestamp)
            .bind(envelope.correlation_id.as_deref())
            .bind(envelope.causation_id.as_deref())
            .bind(envelope.user_id.as_deref())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    EventStoreError::ConcurrencyConflict {
                        aggregate_id: envelope.aggregate_id.clone(),
                        version: envelope.aggregate_version,
                    }
                } else {
                    map_sqlx_error("insert_event", e)
                }
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        debug!(batch_size = envelopes.len(), "Appended events");
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn events_for(&self, aggregate_id: &str) -> Result<Vec<EventEnvelope>, EventStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                event_id,
                aggregate_id,
                aggregate_type,
                event_type,
                aggregate_version,
                event_version,
                payload,
                timestamp,
                correlation_id,
                causation_id,
                user_id
            FROM events
            WHERE aggregate_id = $1
            ORDER BY aggregate_version ASC
            "#,
        )
        .bind(aggregate_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_events", e))?;

        rows.iter().map(envelope_from_row).collect()
    }
}

fn envelope_from_row(row: &sqlx::postgres::PgRow) -> Result<EventEnvelope, EventStoreError> {
    let decode = |e: sqlx::Error| EventStoreError::Serialization(format!("failed to decode event row: {}", e));

    let aggregate_version: i64 = row.try_get("aggregate_version").map_err(decode)?;
    let event_version: i32 = row.try_get("event_version").map_err(decode)?;

    Ok(EventEnvelope {
        event_id: row.try_get::<Uuid, _>("event_id").map_err(decode)?,
        event_type: row.try_get("event_type").map_err(decode)?,
        aggregate_id: row.try_get("aggregate_id").map_err(decode)?,
        aggregate_type: row.try_get("aggregate_type").map_err(decode)?,
        aggregate_version: version_from_db(aggregate_version).map_err(EventStoreError::Serialization)?,
        event_version: u32::try_from(event_version)
            .map_err(|_| EventStoreError::Serialization(format!("negative event version {}", event_version)))?,
        timestamp: row.try_get::<DateTime<Utc>, _>("timestamp").map_err(decode)?,
        correlation_id: row.try_get("correlation_id").map_err(decode)?,
        causation_id: row.try_get("causation_id").map_err(decode)?,
        user_id: row.try_get("user_id").map_err(decode)?,
        payload: row.try_get("payload").map_err(decode)?,
    })
}
