// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory fabric repository
//!
//! The whole map sits behind one `tokio::sync::Mutex`, so every operation is
//! serialized the way row locks and conditional writes serialize them in
//! Postgres.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::{previous_version, FabricRepository, RepositoryError};
use crate::domain::{Fabric, FabricCode, FabricStatus};

/// Fabric rows held in process memory
#[derive(Default)]
pub struct InMemoryFabricRepository {
    rows: Mutex<HashMap<FabricCode, Fabric>>,
}

impl InMemoryFabricRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, deleted ones included
    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }
}

/// Stored copy without pending events
fn row_of(fabric: &Fabric) -> Fabric {
    Fabric::restore(
        fabric.code().clone(),
        fabric.details(),
        fabric.status(),
        fabric.version(),
    )
}

#[async_trait]
impl FabricRepository for InMemoryFabricRepository {
    async fn save(&self, fabric: &Fabric) -> Result<Fabric, RepositoryError> {
        let mut rows = self.rows.lock().await;

        match rows.get(fabric.code()) {
            Some(existing) if existing.is_active() => {
                Err(RepositoryError::DuplicateCode(fabric.code().clone()))
            }
            Some(existing) => {
                let mut revived = existing.clone();
                revived.reactivate(fabric.details(), existing.version())?;
                rows.insert(fabric.code().clone(), row_of(&revived));
                Ok(revived)
            }
            None => {
                rows.insert(fabric.code().clone(), row_of(fabric));
                Ok(fabric.clone())
            }
        }
    }

    async fn get_active(&self, code: &FabricCode) -> Result<Fabric, RepositoryError> {
        let rows = self.rows.lock().await;
        rows.get(code)
            .filter(|f| f.is_active())
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(code.clone()))
    }

    async fn get_including_deleted(&self, code: &FabricCode) -> Result<Fabric, RepositoryError> {
        let rows = self.rows.lock().await;
        rows.get(code)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(code.clone()))
    }

    async fn update(&self, fabric: &Fabric) -> Result<(), RepositoryError> {
        let previous = previous_version(fabric)?;
        let mut rows = self.rows.lock().await;

        match rows.get_mut(fabric.code()) {
            Some(row) if row.is_active() && row.version() == previous => {
                *row = Fabric::restore(
                    fabric.code().clone(),
                    fabric.details(),
                    FabricStatus::Active,
                    fabric.version(),
                );
                Ok(())
            }
            _ => Err(RepositoryError::NotFound(fabric.code().clone())),
        }
    }

    async fn delete(&self, fabric: &Fabric) -> Result<(), RepositoryError> {
        let previous = previous_version(fabric)?;
        let mut rows = self.rows.lock().await;

        match rows.get_mut(fabric.code()) {
            Some(row) if row.is_active() && row.version() == previous => {
                *row = Fabric::restore(
                    fabric.code().clone(),
                    row.details(),
                    FabricStatus::Deleted,
                    fabric.version(),
                );
                Ok(())
            }
            _ => Err(RepositoryError::NotFound(fabric.code().clone())),
        }
    }
}
