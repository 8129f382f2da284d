// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fabric Domain Model
//!
//! # Value Objects with Invariants
//!
//! - [`FabricCode`] - 2-30 uppercase alphanumeric characters
//! - [`FabricDetails`] - name (1-250 characters), measure unit, offer status
//!
//! # Aggregate
//!
//! - [`Fabric`] - versioned entity with optimistic concurrency and a queue of
//!   pending [`crate::events::FabricEvent`]s
//!
//! No I/O happens here. Persistence and publication are driven by
//! [`crate::service`].

pub mod code;
pub mod fabric;

pub use code::{FabricCode, ValidationError};
pub use fabric::{Fabric, FabricDetails, FabricError, FabricStatus, UnknownStatus};
