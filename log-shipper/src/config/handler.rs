//! Handler configuration and context.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use log_shipper_repository::config::{DEFAULT_HOST, DEFAULT_PORT};
use chrono::Utc;
use log_shipper_repository::{validate_index_name, StoreConnectionConfig};
use log_shipper_shared::BusEvent;
use tokio::sync::broadcast;
use tracing::warn;

use crate::config::source::ConfigSource;
use crate::filter::{FilterConfig, MatchMode};
use crate::rotation::current_index_name;

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// Connection mode for the index store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionMode {
    /// Fail immediately if the store is unreachable.
    #[default]
    FailFast,
    /// Retry until the store is reachable.
    Retry,
}

impl FromStr for ConnectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Ok(Self::FailFast),
            "retry" => Ok(Self::Retry),
            other => Err(format!("unknown connection mode '{}'", other)),
        }
    }
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FailFast => write!(f, "fail-fast"),
            Self::Retry => write!(f, "retry"),
        }
    }
}

/// Default index prefix for a handler: the last `.` or `_` separated segment
/// of its name, lower-cased.
///
/// # Example
///
/// ```
/// use log_shipper::config::default_index_prefix;
///
/// assert_eq!(default_index_prefix("handler_elasticsearch"), "elasticsearch");
/// assert_eq!(default_index_prefix("qframe.handler.es"), "es");
/// ```
pub fn default_index_prefix(name: &str) -> String {
    let segment = name
        .rsplit(['.', '_'])
        .find(|s| !s.is_empty())
        .unwrap_or(name);
    segment.to_lowercase()
}

/// Fully resolved configuration of one handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Handler name the keys were looked up under.
    pub name: String,
    /// Where the index store lives.
    pub store: StoreConnectionConfig,
    /// Prefix of the day indices.
    pub index_prefix: String,
    /// Which messages are shipped.
    pub filter: FilterConfig,
    /// What to do when the store is unreachable at start-up.
    pub connection_mode: ConnectionMode,
    /// Delay between connection attempts in retry mode.
    pub retry_interval: Duration,
}

impl HandlerConfig {
    /// Resolve every key for handler `name`, falling back to defaults.
    ///
    /// # Keys (under `handler.<name>.`)
    ///
    /// - `host`: store host (default: localhost)
    /// - `port`: store port (default: 9200)
    /// - `index-prefix`: index prefix, lower-cased (default: see [`default_index_prefix`])
    /// - `inputs`: comma-separated accepted sources (default: all)
    /// - `source-success`: `true`, `false` or `any` (default: true)
    /// - `match-mode`: `exact-any-hop` or `last-hop-only` (default: exact-any-hop)
    /// - `connection-mode`: `fail-fast` or `retry` (default: fail-fast)
    /// - `retry-interval-secs`: seconds between attempts (default: 15)
    ///
    /// Malformed values are logged and replaced by their default.
    pub fn load(name: &str, source: &dyn ConfigSource) -> Self {
        let lookup = |key: &str| source.get(&format!("handler.{}.{}", name, key));

        let host = lookup("host")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or_default(name, "port", lookup("port"), DEFAULT_PORT);

        let index_prefix = lookup("index-prefix")
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .and_then(|p| match validate_index_name(&current_index_name(&p, &Utc::now())) {
                Ok(()) => Some(p),
                Err(e) => {
                    warn!(handler = %name, key = "index-prefix", value = %p, error = %e, "Invalid value, using default");
                    None
                }
            })
            .unwrap_or_else(|| default_index_prefix(name));

        let inputs = lookup("inputs")
            .map(|raw| FilterConfig::parse_inputs(&raw))
            .unwrap_or_default();
        let required_success = match lookup("source-success") {
            None => Some(true),
            Some(raw) => parse_success_state(&raw).unwrap_or_else(|| {
                warn!(handler = %name, key = "source-success", value = %raw, "Invalid value, using default");
                Some(true)
            }),
        };
        let match_mode = parse_or_default(
            name,
            "match-mode",
            lookup("match-mode"),
            MatchMode::default(),
        );

        let connection_mode = parse_or_default(
            name,
            "connection-mode",
            lookup("connection-mode"),
            ConnectionMode::default(),
        );
        let retry_interval_secs = parse_or_default(
            name,
            "retry-interval-secs",
            lookup("retry-interval-secs"),
            DEFAULT_RETRY_INTERVAL_SECS,
        );

        Self {
            name: name.to_string(),
            store: StoreConnectionConfig::new(host.trim(), port),
            index_prefix,
            filter: FilterConfig {
                inputs,
                match_mode,
                required_success,
            },
            connection_mode,
            retry_interval: Duration::from_secs(retry_interval_secs),
        }
    }
}

/// Parse `source-success`: a boolean, or `any` to accept both states.
fn parse_success_state(raw: &str) -> Option<Option<bool>> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(Some(true)),
        "false" | "no" | "0" => Some(Some(false)),
        "any" | "all" => Some(None),
        _ => None,
    }
}

fn parse_or_default<T: FromStr>(handler: &str, key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(handler = %handler, key = %key, value = %raw, "Invalid value, using default");
            default
        }),
    }
}

/// Everything a handler instance is given by its host.
///
/// The bus subscription is taken when the context is created, so nothing
/// published afterwards is missed while the pipeline is still connecting.
pub struct HandlerContext {
    pub name: String,
    pub version: String,
    pub bus: broadcast::Receiver<BusEvent>,
    pub config: Arc<dyn ConfigSource>,
}

impl HandlerContext {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        bus: broadcast::Receiver<BusEvent>,
        config: Arc<dyn ConfigSource>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            bus,
            config,
        }
    }

    /// Resolve this handler's configuration.
    pub fn handler_config(&self) -> HandlerConfig {
        HandlerConfig::load(&self.name, self.config.as_ref())
    }
}
