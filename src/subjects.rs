// Copyright (c) 2025 - Cowboy AI, Inc.

//! NATS subject and event-type hierarchy for fabric events
//!
//! Subjects and event types share one namespaced pattern:
//!
//! ```text
//! {namespace}.fabric              channel subject
//! {namespace}.fabric.{operation}  event type
//! {namespace}.*                   namespace-wide subscription
//! ```
//!
//! Two namespaces exist: `app` for facts this service records and publishes,
//! and `erp` for facts arriving from the upstream ERP feed.
//!
//! # Examples
//!
//! ```rust
//! use fabric_sync::subjects::{Namespace, Operation, SubjectBuilder};
//!
//! let event_type = SubjectBuilder::new(Namespace::App)
//!     .operation(Operation::Created)
//!     .build();
//! assert_eq!(event_type, "app.fabric.created");
//!
//! let channel = SubjectBuilder::new(Namespace::Erp).build();
//! assert_eq!(channel, "erp.fabric");
//!
//! assert_eq!(SubjectBuilder::namespace_wildcard(Namespace::Erp), "erp.*");
//! ```

use std::fmt;

/// Aggregate segment shared by every fabric subject
pub const FABRIC_AGGREGATE: &str = "fabric";

/// Subject namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Facts recorded and published by this service
    App,
    /// Facts emitted by the upstream ERP system
    Erp,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::App => write!(f, "app"),
            Namespace::Erp => write!(f, "erp"),
        }
    }
}

/// Fabric lifecycle operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// A fabric was created
    Created,
    /// A fabric's details changed
    Updated,
    /// A fabric was soft-deleted
    Deleted,
    /// A deleted fabric was brought back
    Reactivated,
}

impl Operation {
    fn parse(segment: &str) -> Option<Self> {
        match segment {
            "created" => Some(Operation::Created),
            "updated" => Some(Operation::Updated),
            "deleted" => Some(Operation::Deleted),
            "reactivated" => Some(Operation::Reactivated),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Created => write!(f, "created"),
            Operation::Updated => write!(f, "updated"),
            Operation::Deleted => write!(f, "deleted"),
            Operation::Reactivated => write!(f, "reactivated"),
        }
    }
}

/// Builder for fabric subjects and event types
#[derive(Debug, Clone)]
pub struct SubjectBuilder {
    namespace: Namespace,
    operation: Option<Operation>,
}

impl SubjectBuilder {
    /// Create a builder rooted at a namespace
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            operation: None,
        }
    }

    /// Set the operation
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Build the subject
    ///
    /// Without an operation this is the channel subject (`app.fabric`).
    pub fn build(self) -> String {
        match self.operation {
            Some(operation) => format!("{}.{}.{}", self.namespace, FABRIC_AGGREGATE, operation),
            None => format!("{}.{}", self.namespace, FABRIC_AGGREGATE),
        }
    }

    /// Subscription matching every channel directly under a namespace
    ///
    /// Returns: `{namespace}.*`
    pub fn namespace_wildcard(namespace: Namespace) -> String {
        format!("{}.*", namespace)
    }

    /// Subscription matching everything under a namespace
    ///
    /// Returns: `{namespace}.>`
    pub fn namespace_all(namespace: Namespace) -> String {
        format!("{}.>", namespace)
    }
}

/// Split a fabric event type into namespace and operation
///
/// Returns `None` for anything that is not `{app|erp}.fabric.{operation}`.
/// Matching is exact; event types are case-sensitive.
pub fn parse_event_type(event_type: &str) -> Option<(Namespace, Operation)> {
    let mut parts = event_type.split('.');
    let namespace = match parts.next()? {
        "app" => Namespace::App,
        "erp" => Namespace::Erp,
        _ => return None,
    };
    if parts.next()? != FABRIC_AGGREGATE {
        return None;
    }
    let operation = Operation::parse(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some((namespace, operation))
}

/// Convenience functions for common subject patterns
pub mod subjects {
    use super::*;

    /// Outward channel for facts recorded by this service
    pub fn app_fabric() -> String {
        SubjectBuilder::new(Namespace::App).build()
    }

    /// Inbound ERP fabric channel
    pub fn erp_fabric() -> String {
        SubjectBuilder::new(Namespace::Erp).build()
    }

    /// Inbound subscription filter for every ERP channel
    pub fn all_erp_channels() -> String {
        SubjectBuilder::namespace_wildcard(Namespace::Erp)
    }

    /// Stream capture pattern for the ERP feed
    pub fn all_erp_events() -> String {
        SubjectBuilder::namespace_all(Namespace::Erp)
    }
}
