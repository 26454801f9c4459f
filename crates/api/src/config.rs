//! Environment-derived configuration (spec §6: "bus URL, bus subject,
//! graph-DB URL + credentials, relational-DB path, and the tunable
//! constants of §4.3").

use std::time::Duration;

use mitigation_graph::ScoringConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for environment variable {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// All process-wide configuration, read once at startup. A failure here is
/// an `InvalidEnvironmentError` (spec §7): fatal, before anything else runs.
pub struct Config {
    pub bus_url: String,
    pub bus_subject: String,
    pub isim_url: String,
    pub store_path: String,
    pub admin_bind: String,
    pub max_in_flight: usize,
    pub scoring: ScoringConfig,
    /// Bounds on the three external calls named in spec §5 — exceeding any
    /// of these is a failure, never a hang.
    pub isim_timeout: Duration,
    pub actuator_timeout: Duration,
    pub store_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            bus_url: env_or("MITIGATION_BUS_URL", "nats://127.0.0.1:4222"),
            bus_subject: env_or("MITIGATION_BUS_SUBJECT", "alerts.ingest"),
            isim_url: required("MITIGATION_ISIM_URL")?,
            store_path: env_or("MITIGATION_STORE_PATH", "mitigation.db"),
            admin_bind: env_or("MITIGATION_ADMIN_BIND", "0.0.0.0:8080"),
            max_in_flight: parsed_or("MITIGATION_MAX_IN_FLIGHT", 32)?,
            isim_timeout: Duration::from_millis(parsed_or("MITIGATION_ISIM_TIMEOUT_MS", 5_000)?),
            actuator_timeout: Duration::from_millis(parsed_or("MITIGATION_ACTUATOR_TIMEOUT_MS", 5_000)?),
            store_timeout: Duration::from_millis(parsed_or("MITIGATION_STORE_TIMEOUT_MS", 5_000)?),
            scoring: ScoringConfig {
                max_conditions: parsed_or("MITIGATION_MAX_CONDITIONS", 100)?,
                graph_interest: parsed_or("MITIGATION_GRAPH_INTEREST", 0.5)?,
                ease_impact: parsed_or("MITIGATION_EASE_IMPACT", 0.3)?,
                probability_epsilon: parsed_or("MITIGATION_PROBABILITY_EPSILON", 1e-4)?,
                probability_threshold: parsed_or("MITIGATION_PROBABILITY_THRESHOLD", 0.75)?,
            },
        })
    }
}

fn env_or(name: &'static str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parsed_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(name) {
        Ok(value) => value.parse().map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
