// Copyright (c) 2025 - Cowboy AI, Inc.
//! Outward event publishing
//!
//! Publishing is best-effort: facts are already recorded in the event store
//! when an envelope reaches a publisher.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::envelope::{EnvelopeError, EventEnvelope};
use crate::nats::NatsClient;

/// Error types for event publishing
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(#[from] EnvelopeError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Sink for envelopes leaving the service
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one envelope on a subject
    async fn publish(&self, subject: &str, envelope: &EventEnvelope) -> Result<(), PublishError>;
}

/// Publishes envelopes as JSON on core NATS
#[derive(Clone)]
pub struct NatsEventPublisher {
    client: NatsClient,
}

impl NatsEventPublisher {
    pub fn new(client: NatsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EventPublisher for NatsEventPublisher {
    async fn publish(&self, subject: &str, envelope: &EventEnvelope) -> Result<(), PublishError> {
        envelope.validate()?;
        let payload = envelope.to_json()?;

        self.client
            .publish_bytes(subject, payload)
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        debug!(
            subject = %subject,
            event_id = %envelope.event_id,
            event_type = %envelope.event_type,
            "Published event"
        );
        Ok(())
    }
}

/// Publisher that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, _subject: &str, envelope: &EventEnvelope) -> Result<(), PublishError> {
        envelope.validate()?;
        Ok(())
    }
}
