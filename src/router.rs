// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inbound message routing
//!
//! Maps a subject to exactly one handler. Matching is exact and
//! case-insensitive; there are no wildcards at this level (the subscription
//! itself carries the wildcard).
//!
//! A message on a subject without a handler is logged and dropped. It is
//! never reported as a failure, so it is acknowledged and not redelivered.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::service::ServiceError;

/// Failure that should make the transport redeliver the message
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    #[error("handler error: {0}")]
    Other(String),
}

/// Handler for raw inbound messages
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handle one message
    ///
    /// `Ok(())` acknowledges the message, including when it was dropped.
    async fn handle(&self, subject: &str, payload: &[u8]) -> Result<(), HandlerError>;
}

/// Subject to handler table
#[derive(Default, Clone)]
pub struct MessageRouter {
    routes: HashMap<String, Arc<dyn MessageHandler>>,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any handler already on the subject
    pub fn register(&mut self, subject: impl AsRef<str>, handler: Arc<dyn MessageHandler>) {
        let key = subject.as_ref().to_ascii_lowercase();
        if self.routes.insert(key, handler).is_some() {
            warn!(subject = %subject.as_ref(), "Replaced existing route");
        }
    }

    /// Builder-style [`MessageRouter::register`]
    pub fn with_route(mut self, subject: impl AsRef<str>, handler: Arc<dyn MessageHandler>) -> Self {
        self.register(subject, handler);
        self
    }

    /// Registered subjects, lowercased and sorted
    pub fn subjects(&self) -> Vec<String> {
        let mut subjects: Vec<String> = self.routes.keys().cloned().collect();
        subjects.sort();
        subjects
    }

    /// Dispatch a message to the handler registered for its subject
    pub async fn route(&self, subject: &str, payload: &[u8]) -> Result<(), HandlerError> {
        match self.routes.get(&subject.to_ascii_lowercase()) {
            Some(handler) => {
                debug!(subject = %subject, payload_size = payload.len(), "Routing message");
                handler.handle(subject, payload).await
            }
            None => {
                warn!(subject = %subject, "No handler registered for subject; dropping message");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl MessageHandler for MessageRouter {
    async fn handle(&self, subject: &str, payload: &[u8]) -> Result<(), HandlerError> {
        self.route(subject, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MessageHandler for Counting {
        async fn handle(&self, _subject: &str, _payload: &[u8]) -> Result<(), HandlerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_case_insensitive_exact_match() {
        let handler = Arc::new(Counting {
            calls: AtomicUsize::new(0),
        });
        let router = MessageRouter::new().with_route("erp.fabric", handler.clone());

        router.route("ERP.Fabric", b"{}").await.unwrap();
        router.route("erp.fabric", b"{}").await.unwrap();
        router.route("erp.fabric.created", b"{}").await.unwrap();

        assert_eq!(handler.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unroutable_is_not_an_error() {
        let router = MessageRouter::new();
        assert!(router.route("erp.yarn", b"{}").await.is_ok());
        assert!(router.subjects().is_empty());
    }

    #[test]
    fn test_subjects_are_normalized() {
        let handler = Arc::new(Counting {
            calls: AtomicUsize::new(0),
        });
        let router = MessageRouter::new().with_route("ERP.Fabric", handler);
        assert_eq!(router.subjects(), vec!["erp.fabric".to_string()]);
    }
}
