// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inbound event adapters
//!
//! Each adapter is a [`crate::router::MessageHandler`] registered on one
//! channel subject.

pub mod fabric_events;

pub use fabric_events::FabricEventHandler;
