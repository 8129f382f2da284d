// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fabric catalogue kept consistent across two ingress paths
//!
//! Synchronous commands and the ERP event feed both drive one versioned
//! [`domain::Fabric`] aggregate through [`service::FabricCommandService`].
//! State lives in one row per fabric; every accepted change is also recorded
//! as an [`envelope::EventEnvelope`] in an append-only [`event_store`].

pub mod config;
pub mod db;
pub mod domain;
pub mod envelope;
pub mod errors;
pub mod event_store;
pub mod events;
pub mod handlers;
pub mod nats;
pub mod publisher;
pub mod repository;
pub mod router;
pub mod service;
pub mod subjects;
pub mod subscriber;

pub use config::{AppConfig, InboundDefaults};
pub use domain::{Fabric, FabricCode, FabricDetails, FabricStatus};
pub use envelope::{EnvelopeOptions, EventEnvelope};
pub use errors::{InfrastructureError, InfrastructureResult};
pub use events::FabricEvent;
pub use nats::{NatsClient, NatsConfig};
pub use router::{HandlerError, MessageHandler, MessageRouter};
pub use service::{CommandSource, FabricCommandService, FabricCommands, Invocation, ServiceError};
