// Copyright (c) 2025 - Cowboy AI, Inc.
//! ERP fabric event adapter
//!
//! Translates `erp.fabric.*` envelopes into fabric commands.
//!
//! # Version Alignment
//!
//! The ERP's `aggregate_version` is the version its event **produces**. Our
//! commands take the version the caller believes is **current**, so the
//! adapter passes `aggregate_version - 1`.
//!
//! # Retry Policy
//!
//! | Outcome | Result |
//! |---------|--------|
//! | Malformed envelope or payload, unknown event type | dropped |
//! | Validation failure, already deleted | dropped |
//! | Duplicate code on create | no-op |
//! | Not found or version conflict on update/delete | no-op |
//! | Infrastructure failure | returned, message redelivered |

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::InboundDefaults;
use crate::domain::FabricDetails;
use crate::envelope::EventEnvelope;
use crate::router::{HandlerError, MessageHandler};
use crate::service::{CommandOutcome, ErrorKind, FabricCommands, Invocation, ServiceResult};
use crate::subjects::{parse_event_type, Namespace, Operation};

/// Payload carried by ERP fabric events
#[derive(Debug, Clone, Deserialize)]
struct ErpFabricPayload {
    #[serde(default)]
    fabric_code: String,
    #[serde(default)]
    fabric_name: String,
    #[serde(default)]
    measure_unit: Option<String>,
    #[serde(default)]
    offer_status: Option<String>,
}

impl ErpFabricPayload {
    /// Details with missing or blank optional fields replaced by defaults
    fn details(&self, defaults: &InboundDefaults) -> FabricDetails {
        let or_default = |value: &Option<String>, default: &str| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        };
        FabricDetails::new(
            self.fabric_name.clone(),
            or_default(&self.measure_unit, &defaults.measure_unit),
            or_default(&self.offer_status, &defaults.offer_status),
        )
    }
}

/// Inbound handler for the ERP fabric channel
pub struct FabricEventHandler {
    service: Arc<dyn FabricCommands>,
    defaults: InboundDefaults,
    command_timeout: Option<Duration>,
}

impl FabricEventHandler {
    pub fn new(service: Arc<dyn FabricCommands>, defaults: InboundDefaults) -> Self {
        Self {
            service,
            defaults,
            command_timeout: None,
        }
    }

    /// Bound each command issued for an inbound event
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    fn invocation(&self, envelope: &EventEnvelope) -> Invocation {
        let event_id = envelope.event_id.to_string();
        let correlation_id = envelope
            .correlation_id
            .clone()
            .unwrap_or_else(|| event_id.clone());

        let mut invocation = Invocation::asynchronous()
            .with_causation_id(event_id)
            .with_correlation_id(correlation_id);
        if let Some(user_id) = &envelope.user_id {
            invocation = invocation.with_user_id(user_id.clone());
        }
        if let Some(timeout) = self.command_timeout {
            invocation = invocation.with_timeout(timeout);
        }
        invocation
    }

    /// Version the command expects, or `None` if the event carries none
    fn expected_version(envelope: &EventEnvelope) -> Option<u64> {
        envelope.aggregate_version.checked_sub(1)
    }

    async fn apply(&self, envelope: &EventEnvelope, operation: Operation, payload: ErpFabricPayload) -> Result<(), HandlerError> {
        let invocation = self.invocation(envelope);
        let code = payload.fabric_code.as_str();
        let details = payload.details(&self.defaults);

        let outcome = match operation {
            Operation::Created => {
                self.service
                    .create_fabric(&invocation, code, details)
                    .await
            }
            Operation::Updated => {
                let Some(expected) = Self::expected_version(envelope) else {
                    warn!(code = %code, event_id = %envelope.event_id, "Update event without a version; dropping");
                    return Ok(());
                };
                if let Err(e) = details.validate() {
                    warn!(code = %code, event_id = %envelope.event_id, error = %e, "Invalid fabric data from ERP; dropping");
                    return Ok(());
                }
                self.service
                    .update_fabric(&invocation, code, details, expected)
                    .await
            }
            Operation::Deleted => {
                let Some(expected) = Self::expected_version(envelope) else {
                    warn!(code = %code, event_id = %envelope.event_id, "Delete event without a version; dropping");
                    return Ok(());
                };
                self.service.delete_fabric(&invocation, code, expected).await
            }
            Operation::Reactivated => {
                warn!(event_type = %envelope.event_type, "Unsupported ERP event type; dropping");
                return Ok(());
            }
        };

        settle(outcome, operation, code, envelope)
    }
}

/// Turn a command result into an ack decision
fn settle(
    outcome: ServiceResult<CommandOutcome>,
    operation: Operation,
    code: &str,
    envelope: &EventEnvelope,
) -> Result<(), HandlerError> {
    let err = match outcome {
        Ok(outcome) => {
            info!(
                code = %code,
                operation = %operation,
                version = outcome.fabric.version(),
                event_id = %envelope.event_id,
                "Applied ERP event"
            );
            return Ok(());
        }
        Err(err) => err,
    };

    match err.kind() {
        ErrorKind::Infrastructure => {
            error!(code = %code, operation = %operation, event_id = %envelope.event_id, error = %err, "Failed to apply ERP event; will retry");
            Err(HandlerError::Service(err))
        }
        ErrorKind::Duplicate | ErrorKind::NotFound | ErrorKind::Conflict => {
            info!(code = %code, operation = %operation, event_id = %envelope.event_id, reason = %err, "ERP event already applied or out of order; skipping");
            Ok(())
        }
        ErrorKind::Validation => {
            warn!(code = %code, operation = %operation, event_id = %envelope.event_id, error = %err, "Invalid fabric data from ERP; dropping");
            Ok(())
        }
    }
}

#[async_trait]
impl MessageHandler for FabricEventHandler {
    async fn handle(&self, subject: &str, payload: &[u8]) -> Result<(), HandlerError> {
        let envelope = match EventEnvelope::from_slice(payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(subject = %subject, error = %e, "Malformed event envelope; dropping");
                return Ok(());
            }
        };

        if let Err(e) = envelope.validate() {
            warn!(subject = %subject, event_id = %envelope.event_id, error = %e, "Invalid event envelope; dropping");
            return Ok(());
        }

        let operation = match parse_event_type(&envelope.event_type) {
            Some((Namespace::Erp, operation)) => operation,
            _ => {
                warn!(subject = %subject, event_type = %envelope.event_type, "Unknown ERP event type; dropping");
                return Ok(());
            }
        };

        let fabric_payload: ErpFabricPayload = match serde_json::from_value(envelope.payload.clone()) {
            Ok(p) => p,
            Err(e) => {
                warn!(subject = %subject, event_id = %envelope.event_id, error = %e, "Malformed fabric payload; dropping");
                return Ok(());
            }
        };

        self.apply(&envelope, operation, fabric_payload).await
    }
}
