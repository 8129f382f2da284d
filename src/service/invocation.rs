// Copyright (c) 2025 - Cowboy AI, Inc.
//! Invocation descriptor passed into every command

use std::time::Duration;
use tokio::time::Instant;

use crate::envelope::EnvelopeOptions;

/// Ingress path a command arrived through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandSource {
    /// Direct request from a caller waiting for the result
    Synchronous,
    /// Message from the subscribed event feed
    Asynchronous,
}

/// Provenance and limits of one command call
///
/// # Examples
///
/// ```rust
/// use fabric_sync::service::{CommandSource, Invocation};
/// use std::time::Duration;
///
/// let invocation = Invocation::synchronous()
///     .with_correlation_id("req-42")
///     .with_user_id("user-7")
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(invocation.source, CommandSource::Synchronous);
/// assert!(invocation.publishes());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub source: CommandSource,
    pub correlation_id: Option<String>,
    pub causation_id: Option<String>,
    pub user_id: Option<String>,
    /// Storage calls not finished by this instant are abandoned
    pub deadline: Option<Instant>,
}

impl Invocation {
    pub fn new(source: CommandSource) -> Self {
        Self {
            source,
            correlation_id: None,
            causation_id: None,
            user_id: None,
            deadline: None,
        }
    }

    pub fn synchronous() -> Self {
        Self::new(CommandSource::Synchronous)
    }

    pub fn asynchronous() -> Self {
        Self::new(CommandSource::Asynchronous)
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_causation_id(mut self, id: impl Into<String>) -> Self {
        self.causation_id = Some(id.into());
        self
    }

    pub fn with_user_id(mut self, id: impl Into<String>) -> Self {
        self.user_id = Some(id.into());
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline relative to now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Only synchronous-origin facts go to the outward channel
    pub fn publishes(&self) -> bool {
        self.source == CommandSource::Synchronous
    }

    /// Metadata copied onto every envelope this command produces
    pub fn envelope_options(&self) -> EnvelopeOptions {
        EnvelopeOptions {
            correlation_id: self.correlation_id.clone(),
            causation_id: self.causation_id.clone(),
            user_id: self.user_id.clone(),
        }
    }
}
