// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fabric Aggregate
//!
//! A pure, in-memory state machine. Every successful operation:
//! 1. Validates business rules before touching state
//! 2. Applies the change and bumps `version` by exactly one
//! 3. Queues exactly one [`FabricEvent`]
//!
//! A failed operation leaves the aggregate untouched.
//!
//! # Lifecycle
//!
//! ```text
//!            create (v=1)
//!                ↓
//!   ┌──────── ACTIVE ◄──────────┐
//!   │ update    │               │ reactivate (v+1)
//!   └──► (v+1)  │ delete (v+1)  │
//!               ↓               │
//!            DELETED ───────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::code::{FabricCode, ValidationError};
use crate::events::{FabricCreated, FabricDeleted, FabricEvent, FabricReactivated, FabricUpdated};

/// Aggregate-level rule violations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FabricError {
    /// Input failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Ordinary mutation attempted on a deleted fabric
    #[error("fabric {0} is already deleted")]
    AlreadyDeleted(FabricCode),

    /// Caller's view of the version is stale
    #[error("concurrency conflict on fabric {code}: expected version {expected}, current version {actual}")]
    ConcurrencyConflict {
        code: FabricCode,
        expected: u64,
        actual: u64,
    },
}

/// Lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FabricStatus {
    Active,
    Deleted,
}

impl FabricStatus {
    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FabricStatus::Active => "ACTIVE",
            FabricStatus::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for FabricStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown status string read back from storage
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown fabric status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for FabricStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(FabricStatus::Active),
            "DELETED" => Ok(FabricStatus::Deleted),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Mutable attributes supplied by create, update and reactivate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricDetails {
    pub name: String,
    pub measure_unit: String,
    pub offer_status: String,
}

impl FabricDetails {
    /// Minimum name length
    pub const MIN_NAME_LENGTH: usize = 1;

    /// Maximum name length
    pub const MAX_NAME_LENGTH: usize = 250;

    pub fn new(
        name: impl Into<String>,
        measure_unit: impl Into<String>,
        offer_status: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            measure_unit: measure_unit.into(),
            offer_status: offer_status.into(),
        }
    }

    /// Check the name bounds
    pub fn validate(&self) -> Result<(), ValidationError> {
        let length = self.name.chars().count();
        if !(Self::MIN_NAME_LENGTH..=Self::MAX_NAME_LENGTH).contains(&length) {
            return Err(ValidationError::NameLength(length));
        }
        Ok(())
    }
}

/// Versioned fabric aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fabric {
    code: FabricCode,
    name: String,
    measure_unit: String,
    offer_status: String,
    status: FabricStatus,
    version: u64,
    pending_events: Vec<FabricEvent>,
}

impl Fabric {
    /// Create a new fabric
    ///
    /// # Business Rules
    /// - Code is 2-30 uppercase alphanumeric characters
    /// - Name is 1-250 characters
    ///
    /// # Returns
    /// - An ACTIVE fabric at version 1 with one `Created` event queued
    pub fn create(code: impl Into<String>, details: FabricDetails) -> Result<Self, FabricError> {
        let code = FabricCode::new(code)?;
        details.validate()?;

        let mut fabric = Self {
            code,
            name: details.name,
            measure_unit: details.measure_unit,
            offer_status: details.offer_status,
            status: FabricStatus::Active,
            version: 1,
            pending_events: Vec::new(),
        };

        let event = FabricEvent::Created(FabricCreated {
            code: fabric.code.clone(),
            name: fabric.name.clone(),
            measure_unit: fabric.measure_unit.clone(),
            offer_status: fabric.offer_status.clone(),
            version: fabric.version,
        });
        fabric.pending_events.push(event);

        Ok(fabric)
    }

    /// Rebuild a fabric from persisted state, with no pending events
    pub fn restore(
        code: FabricCode,
        details: FabricDetails,
        status: FabricStatus,
        version: u64,
    ) -> Self {
        Self {
            code,
            name: details.name,
            measure_unit: details.measure_unit,
            offer_status: details.offer_status,
            status,
            version,
            pending_events: Vec::new(),
        }
    }

    /// Replace the details of an active fabric
    ///
    /// # Business Rules
    /// - Fabric must not be deleted
    /// - `expected_version` must equal the current version
    /// - Name is 1-250 characters
    pub fn update(&mut self, details: FabricDetails, expected_version: u64) -> Result<(), FabricError> {
        if self.status == FabricStatus::Deleted {
            return Err(FabricError::AlreadyDeleted(self.code.clone()));
        }
        self.check_version(expected_version)?;
        details.validate()?;

        self.apply_details(details);
        self.version += 1;

        let event = FabricEvent::Updated(FabricUpdated {
            code: self.code.clone(),
            name: self.name.clone(),
            measure_unit: self.measure_unit.clone(),
            offer_status: self.offer_status.clone(),
            version: self.version,
        });
        self.pending_events.push(event);

        Ok(())
    }

    /// Soft-delete an active fabric
    ///
    /// # Business Rules
    /// - Fabric must not be deleted already
    /// - `expected_version` must equal the current version
    pub fn delete(&mut self, expected_version: u64) -> Result<(), FabricError> {
        if self.status == FabricStatus::Deleted {
            return Err(FabricError::AlreadyDeleted(self.code.clone()));
        }
        self.check_version(expected_version)?;

        self.status = FabricStatus::Deleted;
        self.version += 1;

        let event = FabricEvent::Deleted(FabricDeleted {
            code: self.code.clone(),
            version: self.version,
        });
        self.pending_events.push(event);

        Ok(())
    }

    /// Bring a deleted fabric back with new details
    ///
    /// An active fabric treats this as an ordinary [`Fabric::update`].
    ///
    /// # Business Rules
    /// - `expected_version` must equal the current version
    /// - Name is 1-250 characters
    /// - The version sequence continues; it never resets
    pub fn reactivate(&mut self, details: FabricDetails, expected_version: u64) -> Result<(), FabricError> {
        if self.status == FabricStatus::Active {
            return self.update(details, expected_version);
        }
        self.check_version(expected_version)?;
        details.validate()?;

        self.apply_details(details);
        self.status = FabricStatus::Active;
        self.version += 1;

        let event = FabricEvent::Reactivated(FabricReactivated {
            code: self.code.clone(),
            name: self.name.clone(),
            measure_unit: self.measure_unit.clone(),
            offer_status: self.offer_status.clone(),
            version: self.version,
        });
        self.pending_events.push(event);

        Ok(())
    }

    fn check_version(&self, expected_version: u64) -> Result<(), FabricError> {
        if expected_version != self.version {
            return Err(FabricError::ConcurrencyConflict {
                code: self.code.clone(),
                expected: expected_version,
                actual: self.version,
            });
        }
        Ok(())
    }

    fn apply_details(&mut self, details: FabricDetails) {
        self.name = details.name;
        self.measure_unit = details.measure_unit;
        self.offer_status = details.offer_status;
    }

    /// Drain queued events, leaving the queue empty
    pub fn take_events(&mut self) -> Vec<FabricEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn pending_events(&self) -> &[FabricEvent] {
        &self.pending_events
    }

    pub fn code(&self) -> &FabricCode {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn measure_unit(&self) -> &str {
        &self.measure_unit
    }

    pub fn offer_status(&self) -> &str {
        &self.offer_status
    }

    pub fn status(&self) -> FabricStatus {
        self.status
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_active(&self) -> bool {
        self.status == FabricStatus::Active
    }

    /// Current details as a value
    pub fn details(&self) -> FabricDetails {
        FabricDetails::new(&self.name, &self.measure_unit, &self.offer_status)
    }
}
