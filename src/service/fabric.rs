// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fabric Command Service
//!
//! One pipeline shared by both ingress paths:
//!
//! ```text
//! Invocation + input
//!      ↓
//! Aggregate operation      (domain failure → abort, nothing written)
//!      ↓
//! Repository write         (row lock / version-conditioned update)
//!      ↓
//! Envelope per event       (event type from the event variant)
//!      ↓
//! Event store append       (one batch; failure → EventsNotRecorded)
//!      ↓
//! Publish                  (synchronous origin only; failures logged)
//! ```
//!
//! # Transaction Semantics
//!
//! The state row commits before the event batch is appended. A crash between
//! the two leaves state advanced with no recorded fact; that case is reported
//! as [`ServiceError::EventsNotRecorded`] so operators can reconcile.
//!
//! A [`ServiceError::DeadlineExceeded`] naming `save`, `update` or `delete`
//! leaves the same gap open: the commit may have reached the server before
//! the deadline dropped the call. Re-read the row before retrying.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::invocation::Invocation;
use crate::domain::{Fabric, FabricCode, FabricDetails, FabricError, ValidationError};
use crate::envelope::EventEnvelope;
use crate::event_store::{EventStore, EventStoreError};
use crate::publisher::EventPublisher;
use crate::repository::{FabricRepository, RepositoryError};
use crate::subjects::subjects;

/// Service layer result type
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service layer errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input failed validation
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Ordinary mutation attempted on a deleted fabric
    #[error("fabric {0} is already deleted")]
    AlreadyDeleted(FabricCode),

    /// Caller's expected version is stale
    #[error("concurrency conflict on fabric {code}: expected version {expected}")]
    ConcurrencyConflict { code: FabricCode, expected: u64 },

    /// An active fabric already uses this code
    #[error("fabric code {0} already exists")]
    DuplicateCode(FabricCode),

    /// No active fabric with this code
    #[error("fabric {0} not found")]
    NotFound(FabricCode),

    /// Invocation deadline passed before a storage call returned
    ///
    /// For a state write the row may still have committed.
    #[error("deadline exceeded during {0}")]
    DeadlineExceeded(&'static str),

    /// State store failure
    #[error("storage error: {0}")]
    Storage(String),

    /// State committed but the matching facts were not recorded
    #[error("fabric {code} advanced to version {version} but its events were not recorded: {reason}")]
    EventsNotRecorded {
        code: FabricCode,
        version: u64,
        reason: String,
        conflict: bool,
    },
}

/// Error category used by ingress paths to pick a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Duplicate,
    NotFound,
    Infrastructure,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation(_) | ServiceError::AlreadyDeleted(_) => ErrorKind::Validation,
            ServiceError::ConcurrencyConflict { .. } => ErrorKind::Conflict,
            ServiceError::DuplicateCode(_) => ErrorKind::Duplicate,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::EventsNotRecorded { conflict: true, .. } => ErrorKind::Conflict,
            ServiceError::DeadlineExceeded(_)
            | ServiceError::Storage(_)
            | ServiceError::EventsNotRecorded { .. } => ErrorKind::Infrastructure,
        }
    }

    /// Only infrastructure failures can succeed on a later attempt
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Infrastructure
    }
}

impl From<FabricError> for ServiceError {
    fn from(err: FabricError) -> Self {
        match err {
            FabricError::Validation(e) => ServiceError::Validation(e),
            FabricError::AlreadyDeleted(code) => ServiceError::AlreadyDeleted(code),
            FabricError::ConcurrencyConflict { code, expected, .. } => {
                ServiceError::ConcurrencyConflict { code, expected }
            }
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateCode(code) => ServiceError::DuplicateCode(code),
            RepositoryError::NotFound(code) => ServiceError::NotFound(code),
            RepositoryError::Domain(e) => e.into(),
            RepositoryError::Database(msg) => ServiceError::Storage(msg),
        }
    }
}

/// Result of a successful command
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    /// Fabric as persisted
    pub fabric: Fabric,
    /// Envelopes recorded for this command, in emission order
    pub events: Vec<EventEnvelope>,
}

/// Fabric command and lookup interface shared by both ingress paths
#[async_trait]
pub trait FabricCommands: Send + Sync {
    /// Create a fabric, or recreate a deleted one
    ///
    /// # Returns
    /// - Version 1 for a new code, or the continued version for a deleted code
    ///
    /// # Errors
    /// - `Validation` for a bad code or name
    /// - `DuplicateCode` when an active fabric already uses the code
    async fn create_fabric(
        &self,
        invocation: &Invocation,
        code: &str,
        details: FabricDetails,
    ) -> ServiceResult<CommandOutcome>;

    /// Replace the details of an active fabric
    ///
    /// # Errors
    /// - `NotFound` when no active fabric has the code
    /// - `ConcurrencyConflict` when `expected_version` is stale
    async fn update_fabric(
        &self,
        invocation: &Invocation,
        code: &str,
        details: FabricDetails,
        expected_version: u64,
    ) -> ServiceResult<CommandOutcome>;

    /// Soft-delete an active fabric
    async fn delete_fabric(
        &self,
        invocation: &Invocation,
        code: &str,
        expected_version: u64,
    ) -> ServiceResult<CommandOutcome>;

    /// Look up an active fabric
    async fn get_by_code(&self, code: &str) -> ServiceResult<Fabric>;

    /// Look up a fabric regardless of status
    async fn get_by_code_including_deleted(&self, code: &str) -> ServiceResult<Fabric>;
}

/// Command service over a repository, an event store and a publisher
pub struct FabricCommandService {
    repository: Arc<dyn FabricRepository>,
    event_store: Arc<dyn EventStore>,
    publisher: Arc<dyn EventPublisher>,
    outbound_subject: String,
}

impl FabricCommandService {
    /// Create a service publishing on the default outward channel
    pub fn new(
        repository: Arc<dyn FabricRepository>,
        event_store: Arc<dyn EventStore>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            event_store,
            publisher,
            outbound_subject: subjects::app_fabric(),
        }
    }

    /// Override the outward channel
    pub fn with_outbound_subject(mut self, subject: impl Into<String>) -> Self {
        self.outbound_subject = subject.into();
        self
    }

    pub fn outbound_subject(&self) -> &str {
        &self.outbound_subject
    }

    /// Tell a lost conditional write apart: moved version or missing row
    async fn classify_missed_write(
        &self,
        invocation: &Invocation,
        code: &FabricCode,
        expected_version: u64,
    ) -> ServiceError {
        match bounded(invocation, "reload", self.repository.get_including_deleted(code)).await {
            Ok(current) if current.is_active() && current.version() != expected_version => {
                ServiceError::ConcurrencyConflict {
                    code: code.clone(),
                    expected: expected_version,
                }
            }
            Ok(_) => ServiceError::NotFound(code.clone()),
            Err(e) => e,
        }
    }

    /// Drain, record and (for synchronous origin) publish pending events
    async fn record(&self, invocation: &Invocation, fabric: &mut Fabric) -> ServiceResult<Vec<EventEnvelope>> {
        let code = fabric.code().clone();
        let version = fabric.version();
        let not_recorded = |reason: String, conflict: bool| {
            error!(
                code = %code,
                version = version,
                reason = %reason,
                "State committed but events were not recorded; manual reconciliation required"
            );
            ServiceError::EventsNotRecorded {
                code: code.clone(),
                version,
                reason,
                conflict,
            }
        };

        let options = invocation.envelope_options();
        let envelopes = match fabric
            .take_events()
            .iter()
            .map(|event| EventEnvelope::from_event(event, options.clone()))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(envelopes) => envelopes,
            Err(e) => return Err(not_recorded(format!("serialization failed: {}", e), false)),
        };

        let append = self.event_store.append(&envelopes);
        let appended = match invocation.deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, append).await {
                Ok(result) => result,
                Err(_) => return Err(not_recorded("deadline exceeded".to_string(), false)),
            },
            None => append.await,
        };
        if let Err(e) = appended {
            let conflict = matches!(e, EventStoreError::ConcurrencyConflict { .. });
            return Err(not_recorded(e.to_string(), conflict));
        }

        if invocation.publishes() {
            for envelope in &envelopes {
                if let Err(e) = self.publisher.publish(&self.outbound_subject, envelope).await {
                    warn!(
                        subject = %self.outbound_subject,
                        event_id = %envelope.event_id,
                        error = %e,
                        "Failed to publish event"
                    );
                }
            }
        }

        debug!(code = %code, count = envelopes.len(), "Recorded events");
        Ok(envelopes)
    }
}

/// Run a storage call within the invocation deadline
async fn bounded<T, E, F>(invocation: &Invocation, operation: &'static str, fut: F) -> ServiceResult<T>
where
    F: Future<Output = Result<T, E>>,
    E: Into<ServiceError>,
{
    match invocation.deadline {
        Some(deadline) => match tokio::time::timeout_at(deadline, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(ServiceError::DeadlineExceeded(operation)),
        },
        None => fut.await.map_err(Into::into),
    }
}

#[async_trait]
impl FabricCommands for FabricCommandService {
    async fn create_fabric(
        &self,
        invocation: &Invocation,
        code: &str,
        details: FabricDetails,
    ) -> ServiceResult<CommandOutcome> {
        let fabric = Fabric::create(code, details)?;

        let mut persisted = bounded(invocation, "save", self.repository.save(&fabric)).await?;
        let events = self.record(invocation, &mut persisted).await?;

        info!(
            code = %persisted.code(),
            version = persisted.version(),
            source = ?invocation.source,
            "Fabric created"
        );
        Ok(CommandOutcome {
            fabric: persisted,
            events,
        })
    }

    async fn update_fabric(
        &self,
        invocation: &Invocation,
        code: &str,
        details: FabricDetails,
        expected_version: u64,
    ) -> ServiceResult<CommandOutcome> {
        let code = FabricCode::new(code)?;

        let mut fabric = bounded(invocation, "load", self.repository.get_active(&code)).await?;
        fabric.update(details, expected_version)?;

        match bounded(invocation, "update", self.repository.update(&fabric)).await {
            Ok(()) => {}
            Err(ServiceError::NotFound(_)) => {
                return Err(self.classify_missed_write(invocation, &code, expected_version).await);
            }
            Err(e) => return Err(e),
        }

        let events = self.record(invocation, &mut fabric).await?;

        info!(
            code = %code,
            version = fabric.version(),
            source = ?invocation.source,
            "Fabric updated"
        );
        Ok(CommandOutcome { fabric, events })
    }

    async fn delete_fabric(
        &self,
        invocation: &Invocation,
        code: &str,
        expected_version: u64,
    ) -> ServiceResult<CommandOutcome> {
        let code = FabricCode::new(code)?;

        let mut fabric = bounded(invocation, "load", self.repository.get_active(&code)).await?;
        fabric.delete(expected_version)?;

        match bounded(invocation, "delete", self.repository.delete(&fabric)).await {
            Ok(()) => {}
            Err(ServiceError::NotFound(_)) => {
                return Err(self.classify_missed_write(invocation, &code, expected_version).await);
            }
            Err(e) => return Err(e),
        }

        let events = self.record(invocation, &mut fabric).await?;

        info!(
            code = %code,
            version = fabric.version(),
            source = ?invocation.source,
            "Fabric deleted"
        );
        Ok(CommandOutcome { fabric, events })
    }

    async fn get_by_code(&self, code: &str) -> ServiceResult<Fabric> {
        let code = FabricCode::new(code)?;
        Ok(self.repository.get_active(&code).await?)
    }

    async fn get_by_code_including_deleted(&self, code: &str) -> ServiceResult<Fabric> {
        let code = FabricCode::new(code)?;
        Ok(self.repository.get_including_deleted(&code).await?)
    }
}
