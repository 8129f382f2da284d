// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Layer for Fabric Management
//!
//! The application service that orchestrates domain logic, state
//! persistence, event recording and publication.
//!
//! # Architecture
//!
//! ```text
//! Synchronous caller         ERP event feed
//!        ↓                         ↓
//!        │                  FabricEventHandler
//!        ↓                         ↓
//!   FabricCommandService (this module)
//!        ↓
//! Aggregate → Repository → EventStore
//!        ↓
//! Outward publish (synchronous origin only)
//! ```
//!
//! # Design Principles
//!
//! 1. **Explicit Provenance**: every command takes an [`Invocation`]
//! 2. **One Pipeline**: both ingress paths run the same steps
//! 3. **Write-Side Conflict Detection**: row locks, conditional updates and
//!    the event store's unique key decide races, not application reads
//! 4. **Bounded Calls**: storage calls honour the invocation deadline
//!
//! # Example
//!
//! ```rust,ignore
//! use fabric_sync::service::{FabricCommandService, FabricCommands, Invocation};
//!
//! let service = FabricCommandService::new(repository, event_store, publisher);
//!
//! let outcome = service
//!     .create_fabric(&Invocation::synchronous(), "FAB1", details)
//!     .await?;
//! assert_eq!(outcome.fabric.version(), 1);
//! ```

pub mod fabric;
pub mod invocation;

pub use fabric::{
    CommandOutcome, ErrorKind, FabricCommandService, FabricCommands, ServiceError, ServiceResult,
};
pub use invocation::{CommandSource, Invocation};
