// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fabric Domain Events
//!
//! Events are immutable facts representing state changes that have occurred.
//!
//! # Event Flow
//!
//! ```text
//! Command → Aggregate → FabricEvent → EventEnvelope → EventStore
//!   (what to do)  (validate)  (what happened)  (identity)    (persist)
//! ```
//!
//! The set of facts is closed: every consumer matches exhaustively on
//! [`FabricEvent`], so adding a variant forces each mapping to be revisited.
//!
//! # Correlation and Causation
//!
//! Domain events hold no metadata. `correlation_id` and `causation_id` are
//! attached when the event is wrapped for storage:
//!
//! ```text
//! erp.fabric.updated (event_id: evt-9, correlation_id: req-1)
//!   ↓
//! app.fabric.updated
//!   correlation_id: req-1
//!   causation_id: evt-9
//! ```

pub mod fabric;

pub use fabric::{FabricCreated, FabricDeleted, FabricEvent, FabricReactivated, FabricUpdated};

/// Aggregate type recorded on every fabric envelope
pub const AGGREGATE_TYPE: &str = "fabric";
