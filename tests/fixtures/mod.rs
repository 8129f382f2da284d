// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for fabric-sync
//!
//! Builders for fabric inputs and ERP envelopes, publisher doubles and an
//! in-memory service wiring shared by the integration tests.
//!
//! # Design Principles
//! - Fixtures are the place that constructs ERP wire messages
//! - Everything runs in memory; no broker or database required

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use fabric_sync::envelope::{EnvelopeOptions, EventEnvelope};
use fabric_sync::event_store::InMemoryEventStore;
use fabric_sync::publisher::{EventPublisher, PublishError};
use fabric_sync::repository::InMemoryFabricRepository;
use fabric_sync::{FabricCommandService, FabricDetails};

pub const FABRIC_CODE: &str = "FAB1";
pub const CORRELATION_ID: &str = "01934f4a-c001-7000-8000-00000000c001";
pub const USER_ID: &str = "user-7";

/// Details for a cotton fabric
pub fn cotton() -> FabricDetails {
    FabricDetails::new("Cotton", "MB", "ACTIVE")
}

/// Details for a silk fabric
pub fn silk() -> FabricDetails {
    FabricDetails::new("Silk", "KG", "ACTIVE")
}

/// Details for a linen fabric
pub fn linen() -> FabricDetails {
    FabricDetails::new("Linen", "MB", "PAUSED")
}

/// ERP payload in the upstream field naming
pub fn erp_payload(code: &str, name: &str) -> Value {
    json!({
        "fabric_code": code,
        "fabric_name": name,
        "measure_unit": "KG",
        "offer_status": "ACTIVE"
    })
}

/// Encoded ERP envelope
pub fn erp_message(event_type: &str, code: &str, version: u64, payload: Value) -> Vec<u8> {
    erp_envelope(event_type, code, version, payload)
        .to_json()
        .expect("envelope serializes")
}

/// ERP envelope with a correlation id
pub fn erp_envelope(event_type: &str, code: &str, version: u64, payload: Value) -> EventEnvelope {
    EventEnvelope::new(
        event_type,
        code,
        "fabric",
        version,
        payload,
        EnvelopeOptions {
            correlation_id: Some(CORRELATION_ID.to_string()),
            ..Default::default()
        },
    )
}

/// Publisher that remembers every envelope it was given
#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(String, EventEnvelope)>>,
}

impl RecordingPublisher {
    pub fn published(&self) -> Vec<(String, EventEnvelope)> {
        self.published.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, subject: &str, envelope: &EventEnvelope) -> Result<(), PublishError> {
        envelope.validate()?;
        self.published
            .lock()
            .unwrap()
            .push((subject.to_string(), envelope.clone()));
        Ok(())
    }
}

/// Publisher whose transport is always down
#[derive(Default)]
pub struct FailingPublisher;

#[async_trait]
impl EventPublisher for FailingPublisher {
    async fn publish(&self, _subject: &str, _envelope: &EventEnvelope) -> Result<(), PublishError> {
        Err(PublishError::Transport("connection refused".to_string()))
    }
}

/// Service over in-memory stores, with handles to inspect them
pub struct Harness {
    pub service: Arc<FabricCommandService>,
    pub repository: Arc<InMemoryFabricRepository>,
    pub event_store: Arc<InMemoryEventStore>,
    pub publisher: Arc<RecordingPublisher>,
}

impl Harness {
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryFabricRepository::new());
        let event_store = Arc::new(InMemoryEventStore::new());
        let publisher = Arc::new(RecordingPublisher::default());
        let service = Arc::new(FabricCommandService::new(
            repository.clone(),
            event_store.clone(),
            publisher.clone(),
        ));

        Self {
            service,
            repository,
            event_store,
            publisher,
        }
    }
}
