// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event Store Abstraction
//!
//! Append-only record of every fact the service accepted. The store is an
//! audit trail; aggregate state is never rebuilt from it.
//!
//! # Architecture
//!
//! ```text
//! Command → Aggregate → Repository (state row, committed first)
//!                           ↓
//!                     EventEnvelope batch → EventStore
//! ```
//!
//! # Event Store Requirements
//!
//! 1. **Append-Only**: Envelopes are never updated or deleted
//! 2. **Atomic Batches**: A batch is recorded completely or not at all
//! 3. **One Fact per Version**: `(aggregate_id, aggregate_version)` is unique
//! 4. **Distinct Conflicts**: A uniqueness violation is reported as
//!    [`EventStoreError::ConcurrencyConflict`], never as a generic failure

use async_trait::async_trait;
use thiserror::Error;

use crate::envelope::{EnvelopeError, EventEnvelope};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;

/// Event store failures
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// A fact for this aggregate version is already recorded
    #[error("event for aggregate {aggregate_id} at version {version} already exists")]
    ConcurrencyConflict { aggregate_id: String, version: u64 },

    /// Envelope rejected before writing
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(#[from] EnvelopeError),

    /// Stored data could not be converted
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Underlying storage failure
    #[error("storage error: {0}")]
    Database(String),
}

impl EventStoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, EventStoreError::ConcurrencyConflict { .. })
    }
}

/// Event Store trait for recording envelopes
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append a batch of envelopes atomically
    ///
    /// # Arguments
    ///
    /// * `envelopes` - Facts to record; an empty batch is a no-op
    ///
    /// # Errors
    ///
    /// - `InvalidEnvelope` if any envelope fails validation (nothing written)
    /// - `ConcurrencyConflict` if any `(aggregate_id, aggregate_version)` is
    ///   already recorded or repeated within the batch (nothing written)
    /// - `Database` if writing to storage fails
    async fn append(&self, envelopes: &[EventEnvelope]) -> Result<(), EventStoreError>;

    /// Read the recorded trail of one aggregate in version order
    async fn events_for(&self, aggregate_id: &str) -> Result<Vec<EventEnvelope>, EventStoreError>;
}
