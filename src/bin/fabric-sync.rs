// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fabric Sync Service
//!
//! Wires the command service to Postgres and NATS and consumes the ERP feed:
//! - ERP events → JetStream → InboundListener → MessageRouter → FabricEventHandler
//! - FabricCommandService → fabrics row + events row → `app.fabric` (synchronous origin)
//!
//! Run with: cargo run --bin fabric-sync
//!
//! Prerequisites:
//! 1. NATS server with JetStream enabled (NATS_URL, default localhost:4222)
//! 2. Postgres with `migrations/0001_fabric_sync.sql` applied (POSTGRES_URI)

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fabric_sync::config::AppConfig;
use fabric_sync::event_store::PostgresEventStore;
use fabric_sync::handlers::FabricEventHandler;
use fabric_sync::publisher::NatsEventPublisher;
use fabric_sync::repository::PostgresFabricRepository;
use fabric_sync::subjects::subjects;
use fabric_sync::subscriber::InboundListener;
use fabric_sync::{db, FabricCommandService, MessageRouter, NatsClient};

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    if config.is_development() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    init_tracing(&config);

    info!(environment = %config.environment, "Starting fabric sync service");

    let pool = db::connect(&config.postgres)
        .await
        .context("Failed to connect to Postgres")?;

    let nats = NatsClient::new(config.nats.clone())
        .await
        .context("Failed to connect to NATS")?;

    let service = Arc::new(
        FabricCommandService::new(
            Arc::new(PostgresFabricRepository::new(pool.clone())),
            Arc::new(PostgresEventStore::new(pool.clone())),
            Arc::new(NatsEventPublisher::new(nats.clone())),
        )
        .with_outbound_subject(config.outbound_subject.clone()),
    );

    let fabric_events = FabricEventHandler::new(service.clone(), config.inbound_defaults.clone())
        .with_command_timeout(config.inbound.command_timeout);
    let router = MessageRouter::new().with_route(subjects::erp_fabric(), Arc::new(fabric_events));
    info!(routes = ?router.subjects(), "Registered inbound routes");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let listener = InboundListener::new(&nats, config.inbound.clone(), Arc::new(router))
        .start(shutdown_rx)
        .await
        .context("Failed to start inbound listener")?;

    info!(outbound = %service.outbound_subject(), "Fabric sync service ready");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutting down");

    // Receiver may already be gone if the listener ended on its own
    let _ = shutdown_tx.send(true);
    listener.await.context("Inbound listener panicked")?;

    nats.flush().await.context("Failed to flush NATS")?;
    pool.close().await;

    info!("Shutdown complete");
    Ok(())
}
