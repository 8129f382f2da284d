// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service configuration
//!
//! Every setting comes from the environment and falls back to a default,
//! except `POSTGRES_URI` which must be provided.

use std::time::Duration;

use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::nats::NatsConfig;
use crate::subjects::subjects;

/// Postgres pool settings
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Connection URL
    pub url: String,
    /// Maximum open connections
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    /// How long an idle connection is kept
    pub idle_timeout: Duration,
    /// How long to wait for a free connection
    pub acquire_timeout: Duration,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost:5432/fabrics".to_string(),
            max_connections: 25,
            min_connections: 25,
            idle_timeout: Duration::from_secs(15 * 60),
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Inbound ERP feed settings
#[derive(Debug, Clone)]
pub struct InboundConfig {
    /// JetStream stream capturing the feed
    pub stream_name: String,
    /// Subjects captured by the stream
    pub stream_subjects: Vec<String>,
    /// Consumer filter
    pub subject: String,
    /// Durable consumer shared by every instance
    pub group: String,
    /// Deadline applied to each inbound-originated command
    pub command_timeout: Duration,
}

impl Default for InboundConfig {
    fn default() -> Self {
        Self {
            stream_name: "ERP_EVENTS".to_string(),
            stream_subjects: vec![subjects::all_erp_events()],
            subject: subjects::all_erp_channels(),
            group: "erp-service-group".to_string(),
            command_timeout: Duration::from_secs(10),
        }
    }
}

/// Values substituted when an inbound creation omits optional fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundDefaults {
    pub measure_unit: String,
    pub offer_status: String,
}

impl Default for InboundDefaults {
    fn default() -> Self {
        Self {
            measure_unit: "MB".to_string(),
            offer_status: "ACTIVE".to_string(),
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Deployment environment (`development`, `production`, ...)
    pub environment: String,
    pub nats: NatsConfig,
    pub postgres: PostgresConfig,
    pub inbound: InboundConfig,
    pub inbound_defaults: InboundDefaults,
    /// Outward channel for synchronous-origin facts
    pub outbound_subject: String,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> InfrastructureResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> InfrastructureResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let nats_defaults = NatsConfig::default();
        let nats = NatsConfig {
            servers: match get("NATS_URL") {
                Some(url) => url.split(',').map(|s| s.trim().to_string()).collect(),
                None => nats_defaults.servers,
            },
            name: get("NATS_CLIENT_NAME").unwrap_or(nats_defaults.name),
            ..nats_defaults
        };

        let pg_defaults = PostgresConfig::default();
        let postgres = PostgresConfig {
            url: get("POSTGRES_URI").ok_or_else(|| {
                InfrastructureError::Configuration("POSTGRES_URI is not set".to_string())
            })?,
            max_connections: parse_or("POSTGRES_OPEN_CONNS", get("POSTGRES_OPEN_CONNS"), pg_defaults.max_connections)?,
            min_connections: parse_or("POSTGRES_IDLE_CONNS", get("POSTGRES_IDLE_CONNS"), pg_defaults.min_connections)?,
            idle_timeout: duration_or("POSTGRES_IDLE_TIME", get("POSTGRES_IDLE_TIME"), pg_defaults.idle_timeout)?,
            acquire_timeout: pg_defaults.acquire_timeout,
        };

        let inbound_defaults = InboundConfig::default();
        let inbound = InboundConfig {
            stream_name: get("INBOUND_STREAM").unwrap_or(inbound_defaults.stream_name),
            stream_subjects: inbound_defaults.stream_subjects,
            subject: get("INBOUND_SUBJECT").unwrap_or(inbound_defaults.subject),
            group: get("INBOUND_GROUP").unwrap_or(inbound_defaults.group),
            command_timeout: duration_or("COMMAND_TIMEOUT", get("COMMAND_TIMEOUT"), inbound_defaults.command_timeout)?,
        };

        let fallback = InboundDefaults::default();
        let defaults = InboundDefaults {
            measure_unit: get("FABRIC_DEFAULT_MEASURE_UNIT").unwrap_or(fallback.measure_unit),
            offer_status: get("FABRIC_DEFAULT_OFFER_STATUS").unwrap_or(fallback.offer_status),
        };

        Ok(Self {
            environment: get("ENV").unwrap_or_else(|| "development".to_string()),
            nats,
            postgres,
            inbound,
            inbound_defaults: defaults,
            outbound_subject: get("OUTBOUND_SUBJECT").unwrap_or_else(subjects::app_fabric),
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, value: Option<String>, default: T) -> InfrastructureResult<T> {
    match value {
        Some(raw) => raw.trim().parse().map_err(|_| {
            InfrastructureError::Configuration(format!("{} must be a number, got {:?}", key, raw))
        }),
        None => Ok(default),
    }
}

fn duration_or(key: &str, value: Option<String>, default: Duration) -> InfrastructureResult<Duration> {
    match value {
        Some(raw) => parse_duration(&raw).ok_or_else(|| {
            InfrastructureError::Configuration(format!(
                "{} must be a duration like 30s, 15m or 1h, got {:?}",
                key, raw
            ))
        }),
        None => Ok(default),
    }
}

/// Parse `<n>`, `<n>s`, `<n>m` or `<n>h`
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (digits, multiplier) = match raw.char_indices().last()? {
        (i, 's') => (&raw[..i], 1),
        (i, 'm') => (&raw[..i], 60),
        (i, 'h') => (&raw[..i], 60 * 60),
        _ => (raw, 1),
    };
    let amount: u64 = digits.parse().ok()?;
    amount.checked_mul(multiplier).map(Duration::from_secs)
}
