// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fabric Domain Events
//!
//! Each variant carries only the fact itself. Identity, ordering and
//! correlation metadata are added by [`crate::envelope::EventEnvelope`].

use serde::{Deserialize, Serialize};

use crate::domain::FabricCode;
use crate::subjects::{Namespace, Operation, SubjectBuilder};

/// Facts emitted by the [`crate::domain::Fabric`] aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FabricEvent {
    /// Fabric was created at version 1
    Created(FabricCreated),

    /// Fabric details changed
    Updated(FabricUpdated),

    /// Fabric was soft-deleted
    Deleted(FabricDeleted),

    /// Deleted fabric was recreated, continuing its version sequence
    Reactivated(FabricReactivated),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricCreated {
    pub code: FabricCode,
    pub name: String,
    pub measure_unit: String,
    pub offer_status: String,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricUpdated {
    pub code: FabricCode,
    pub name: String,
    pub measure_unit: String,
    pub offer_status: String,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricDeleted {
    pub code: FabricCode,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricReactivated {
    pub code: FabricCode,
    pub name: String,
    pub measure_unit: String,
    pub offer_status: String,
    pub version: u64,
}

impl FabricEvent {
    /// Lifecycle operation this event records
    pub fn operation(&self) -> Operation {
        match self {
            FabricEvent::Created(_) => Operation::Created,
            FabricEvent::Updated(_) => Operation::Updated,
            FabricEvent::Deleted(_) => Operation::Deleted,
            FabricEvent::Reactivated(_) => Operation::Reactivated,
        }
    }

    /// Namespaced event type, e.g. `app.fabric.updated`
    pub fn event_type(&self) -> String {
        SubjectBuilder::new(Namespace::App)
            .operation(self.operation())
            .build()
    }

    /// Code of the fabric this event belongs to
    pub fn code(&self) -> &FabricCode {
        match self {
            FabricEvent::Created(e) => &e.code,
            FabricEvent::Updated(e) => &e.code,
            FabricEvent::Deleted(e) => &e.code,
            FabricEvent::Reactivated(e) => &e.code,
        }
    }

    /// Aggregate version this event produced
    pub fn version(&self) -> u64 {
        match self {
            FabricEvent::Created(e) => e.version,
            FabricEvent::Updated(e) => e.version,
            FabricEvent::Deleted(e) => e.version,
            FabricEvent::Reactivated(e) => e.version,
        }
    }

    /// Untagged JSON body of the fact, used as the envelope payload
    pub fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            FabricEvent::Created(e) => serde_json::to_value(e),
            FabricEvent::Updated(e) => serde_json::to_value(e),
            FabricEvent::Deleted(e) => serde_json::to_value(e),
            FabricEvent::Reactivated(e) => serde_json::to_value(e),
        }
    }
}
