// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inbound listener for the ERP event feed
//!
//! Consumes the feed through a durable JetStream pull consumer. Every
//! instance binds the same durable name, so the consumer acts as a consumer
//! group: each message goes to one instance at a time, and a message that is
//! not acknowledged is redelivered.
//!
//! ```text
//! erp.> → stream ERP_EVENTS → durable "erp-service-group" (filter erp.*)
//!                                   ↓  one message at a time
//!                             MessageRouter → handler
//!                                   ↓
//!                              ack | nak
//! ```

use async_nats::jetstream::{self, consumer::pull, consumer::AckPolicy, AckKind};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::InboundConfig;
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::nats::NatsClient;
use crate::router::{HandlerError, MessageHandler};

/// What to tell the broker about a processed message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Done, including dropped messages
    Ack,
    /// Redeliver later
    Nak,
}

impl Disposition {
    pub fn for_result(result: &Result<(), HandlerError>) -> Self {
        match result {
            Ok(()) => Disposition::Ack,
            Err(_) => Disposition::Nak,
        }
    }
}

/// Long-lived consumer of the inbound feed
pub struct InboundListener {
    jetstream: jetstream::Context,
    config: InboundConfig,
    handler: Arc<dyn MessageHandler>,
}

impl InboundListener {
    pub fn new(client: &NatsClient, config: InboundConfig, handler: Arc<dyn MessageHandler>) -> Self {
        Self {
            jetstream: client.jetstream(),
            config,
            handler,
        }
    }

    /// Ensure the stream and durable consumer exist, then start consuming
    ///
    /// The returned task ends when `shutdown` flips or its sender is dropped.
    pub async fn start(self, shutdown: watch::Receiver<bool>) -> InfrastructureResult<JoinHandle<()>> {
        let stream = self
            .jetstream
            .get_or_create_stream(jetstream::stream::Config {
                name: self.config.stream_name.clone(),
                subjects: self.config.stream_subjects.clone(),
                ..Default::default()
            })
            .await
            .map_err(|e| InfrastructureError::JetStream(e.to_string()))?;

        let consumer: jetstream::consumer::Consumer<pull::Config> = stream
            .get_or_create_consumer(
                &self.config.group,
                pull::Config {
                    durable_name: Some(self.config.group.clone()),
                    filter_subject: self.config.subject.clone(),
                    ack_policy: AckPolicy::Explicit,
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| InfrastructureError::JetStream(e.to_string()))?;

        let messages = consumer
            .messages()
            .await
            .map_err(|e| InfrastructureError::NatsSubscribe(e.to_string()))?;

        info!(
            stream = %self.config.stream_name,
            subject = %self.config.subject,
            group = %self.config.group,
            "Started inbound listener"
        );

        let handler = self.handler;
        let subject = self.config.subject;
        Ok(tokio::spawn(async move {
            process_messages(messages, handler, shutdown).await;
            warn!(subject = %subject, "Inbound listener stopped");
        }))
    }
}

async fn process_messages(
    mut messages: pull::Stream,
    handler: Arc<dyn MessageHandler>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                info!("Shutdown requested; leaving inbound loop");
                break;
            }
            next = messages.next() => match next {
                Some(Ok(message)) => process_message(handler.as_ref(), message).await,
                Some(Err(e)) => warn!(error = %e, "Error receiving message"),
                None => break,
            },
        }
    }
}

async fn process_message(handler: &dyn MessageHandler, message: jetstream::Message) {
    let subject = message.subject.to_string();
    debug!(subject = %subject, payload_size = message.payload.len(), "Received message");

    let result = handler.handle(&subject, &message.payload).await;
    if let Err(e) = &result {
        error!(subject = %subject, error = %e, "Handler failed; message will be redelivered");
    }

    let ack = match Disposition::for_result(&result) {
        Disposition::Ack => message.ack().await,
        Disposition::Nak => message.ack_with(AckKind::Nak(None)).await,
    };
    if let Err(e) = ack {
        warn!(subject = %subject, error = %e, "Failed to acknowledge message");
    }
}
