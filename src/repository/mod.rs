// Copyright (c) 2025 - Cowboy AI, Inc.
//! Command Repository
//!
//! Current-state persistence for fabrics: one row per code, never deleted.
//!
//! # Write Discipline
//!
//! ```text
//! save    SELECT ... FOR UPDATE → DuplicateCode | reactivate + UPDATE | INSERT
//! update  UPDATE ... WHERE code = $c AND version = $new - 1 AND status = 'ACTIVE'
//! delete  UPDATE ... WHERE code = $c AND version = $new - 1 AND status = 'ACTIVE'
//! ```
//!
//! Conflicts are detected by the write itself (row lock, conditional update)
//! rather than by read-then-compare in application code. A conditional write
//! that matches no row reports [`RepositoryError::NotFound`]; that covers both
//! a missing row and a version that already moved.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Fabric, FabricCode, FabricError};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryFabricRepository;
pub use postgres::PostgresFabricRepository;

/// Repository failures
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// An active fabric already uses this code
    #[error("fabric code {0} already exists")]
    DuplicateCode(FabricCode),

    /// No row matched
    #[error("fabric {0} not found")]
    NotFound(FabricCode),

    /// Reactivating a deleted row broke an aggregate rule
    #[error(transparent)]
    Domain(#[from] FabricError),

    /// Underlying storage failure or unreadable row
    #[error("storage error: {0}")]
    Database(String),
}

/// Current-state store for fabrics
#[async_trait]
pub trait FabricRepository: Send + Sync {
    /// Persist a newly created fabric
    ///
    /// If a DELETED row exists for the code, that row is reactivated with the
    /// new details instead, continuing its version sequence.
    ///
    /// # Returns
    ///
    /// The aggregate actually persisted, with its pending events
    ///
    /// # Errors
    ///
    /// - `DuplicateCode` if an ACTIVE row exists
    /// - `Domain` if reactivation rejects the new details
    async fn save(&self, fabric: &Fabric) -> Result<Fabric, RepositoryError>;

    /// Load an ACTIVE fabric; DELETED rows are reported as `NotFound`
    async fn get_active(&self, code: &FabricCode) -> Result<Fabric, RepositoryError>;

    /// Load a fabric regardless of status
    async fn get_including_deleted(&self, code: &FabricCode) -> Result<Fabric, RepositoryError>;

    /// Write the details and version of an updated fabric
    ///
    /// Conditioned on the stored row being ACTIVE at `fabric.version() - 1`.
    async fn update(&self, fabric: &Fabric) -> Result<(), RepositoryError>;

    /// Mark a fabric DELETED at its new version
    ///
    /// Conditioned on the stored row being ACTIVE at `fabric.version() - 1`.
    async fn delete(&self, fabric: &Fabric) -> Result<(), RepositoryError>;
}

/// Version the stored row must hold for a conditional write to apply
pub(crate) fn previous_version(fabric: &Fabric) -> Result<u64, RepositoryError> {
    fabric
        .version()
        .checked_sub(1)
        .filter(|v| *v >= 1)
        .ok_or_else(|| RepositoryError::NotFound(fabric.code().clone()))
}
