// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory event store
//!
//! Same contract as [`super::PostgresEventStore`], held in process memory.
//! Used by tests and by local runs without a database.

use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::Mutex;

use super::{EventStore, EventStoreError};
use crate::envelope::EventEnvelope;

#[derive(Default)]
struct Inner {
    events: Vec<EventEnvelope>,
    keys: HashSet<(String, u64)>,
}

/// Event store backed by a mutex-guarded vector
#[derive(Default)]
pub struct InMemoryEventStore {
    inner: Mutex<Inner>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.events.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.events.is_empty()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, envelopes: &[EventEnvelope]) -> Result<(), EventStoreError> {
        let mut inner = self.inner.lock().await;

        // Check the whole batch before writing anything
        let mut batch_keys = HashSet::with_capacity(envelopes.len());
        for envelope in envelopes {
            envelope.validate()?;
            let key = (envelope.aggregate_id.clone(), envelope.aggregate_version);
            if inner.keys.contains(&key) || !batch_keys.insert(key) {
                return Err(EventStoreError::ConcurrencyConflict {
                    aggregate_id: envelope.aggregate_id.clone(),
                    version: envelope.aggregate_version,
                });
            }
        }

        inner.keys.extend(batch_keys);
        inner.events.extend_from_slice(envelopes);
        Ok(())
    }

    async fn events_for(&self, aggregate_id: &str) -> Result<Vec<EventEnvelope>, EventStoreError> {
        let inner = self.inner.lock().await;
        let mut events: Vec<EventEnvelope> = inner
            .events
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.aggregate_version);
        Ok(events)
    }
}
