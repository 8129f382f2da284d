// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event Envelope
//!
//! The durable and transmissible wrapper around one fact. The same JSON shape
//! is written to the event store, published on the outward channel and
//! expected on the inbound ERP feed.
//!
//! ```json
//! {
//!   "event_id": "0190f3c1-...",
//!   "event_type": "app.fabric.updated",
//!   "aggregate_id": "FAB1",
//!   "aggregate_type": "fabric",
//!   "aggregate_version": 2,
//!   "event_version": 1,
//!   "timestamp": "2025-01-01T00:00:00Z",
//!   "correlation_id": "req-1",
//!   "payload": { "code": "FAB1", "name": "Silk", ... }
//! }
//! ```
//!
//! `(aggregate_id, aggregate_version)` identifies exactly one fact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::events::{FabricEvent, AGGREGATE_TYPE};

/// Envelope schema version written by this crate
pub const CURRENT_EVENT_VERSION: u32 = 1;

fn default_event_version() -> u32 {
    CURRENT_EVENT_VERSION
}

/// Reason an envelope is not acceptable downstream
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("event type is required")]
    MissingEventType,

    #[error("aggregate ID is required")]
    MissingAggregateId,

    #[error("aggregate type is required")]
    MissingAggregateType,

    #[error("payload is required")]
    MissingPayload,
}

/// Optional envelope metadata
///
/// Every field defaults to absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvelopeOptions {
    /// Groups every fact produced by one request or upstream event
    pub correlation_id: Option<String>,
    /// Identifier of the fact or request that directly caused this one
    pub causation_id: Option<String>,
    /// Acting user, for audit
    pub user_id: Option<String>,
}

/// One fact with identity and ordering metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: Uuid,
    pub event_type: String,
    pub aggregate_id: String,
    pub aggregate_type: String,
    #[serde(default)]
    pub aggregate_version: u64,
    #[serde(default = "default_event_version")]
    pub event_version: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    /// Create an envelope with a fresh id and the current time
    pub fn new(
        event_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        aggregate_type: impl Into<String>,
        aggregate_version: u64,
        payload: serde_json::Value,
        options: EnvelopeOptions,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            event_type: event_type.into(),
            aggregate_id: aggregate_id.into(),
            aggregate_type: aggregate_type.into(),
            aggregate_version,
            event_version: CURRENT_EVENT_VERSION,
            timestamp: Utc::now(),
            correlation_id: options.correlation_id,
            causation_id: options.causation_id,
            user_id: options.user_id,
            payload,
        }
    }

    /// Wrap a fabric domain event
    ///
    /// Event type, aggregate id and version come from the event itself.
    pub fn from_event(event: &FabricEvent, options: EnvelopeOptions) -> Result<Self, serde_json::Error> {
        Ok(Self::new(
            event.event_type(),
            event.code().as_str(),
            AGGREGATE_TYPE,
            event.version(),
            event.payload()?,
            options,
        ))
    }

    /// Check the required fields, in a fixed order
    pub fn validate(&self) -> Result<(), EnvelopeError> {
        if self.event_type.is_empty() {
            return Err(EnvelopeError::MissingEventType);
        }
        if self.aggregate_id.is_empty() {
            return Err(EnvelopeError::MissingAggregateId);
        }
        if self.aggregate_type.is_empty() {
            return Err(EnvelopeError::MissingAggregateType);
        }
        let empty_payload = match &self.payload {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if empty_payload {
            return Err(EnvelopeError::MissingPayload);
        }
        Ok(())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode from JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
