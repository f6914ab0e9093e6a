//! Service configuration from environment variables.

use crate::error::ConfigError;
use source_gateway::{GatewayConfig, DEFAULT_BASE_URL, DEFAULT_CONCURRENCY_LIMIT};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SCHEDULE_INTERVAL_SECS: u64 = 6 * 60 * 60;
const DEFAULT_HEALTH_CHECK_INTERVAL_SECS: u64 = 300;
const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
const DEFAULT_HTTP_PORT: u16 = 8084;
const DEFAULT_METRICS_PORT: u16 = 9094;

/// Deployment environment. The manual trigger is only mounted outside production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment {:?}", other)),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        })
    }
}

#[derive(Debug, Clone)]
pub struct EtlConfig {
    pub gateway: GatewayConfig,
    /// Max in-flight fetches/writes per chain.
    pub concurrency_limit: usize,
    pub schedule_interval: Duration,
    /// `None` disables the upstream health monitor.
    pub health_check_interval: Option<Duration>,
    pub run_on_startup: bool,
    pub environment: Environment,
    pub redis_url: String,
    pub http_port: u16,
    pub metrics_port: u16,
}

impl EtlConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let concurrency_limit: usize =
            parse_or(&get, "ETL_CONCURRENCY_LIMIT", DEFAULT_CONCURRENCY_LIMIT)?;
        if concurrency_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "ETL_CONCURRENCY_LIMIT".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let timeout_secs: u64 = parse_or(&get, "SUPERMARKET_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "SUPERMARKET_API_TIMEOUT_SECS".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let schedule_secs: u64 =
            parse_or(&get, "ETL_SCHEDULE_INTERVAL_SECS", DEFAULT_SCHEDULE_INTERVAL_SECS)?;
        if schedule_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "ETL_SCHEDULE_INTERVAL_SECS".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let health_secs: u64 = parse_or(
            &get,
            "ETL_HEALTH_CHECK_INTERVAL_SECS",
            DEFAULT_HEALTH_CHECK_INTERVAL_SECS,
        )?;

        let run_on_startup = match get("ETL_RUN_ON_STARTUP") {
            Some(v) => parse_bool("ETL_RUN_ON_STARTUP", &v)?,
            None => false,
        };

        let environment = match get("ETL_ENVIRONMENT") {
            Some(v) => v.parse().map_err(|reason| ConfigError::Invalid {
                key: "ETL_ENVIRONMENT".to_string(),
                value: v.clone(),
                reason,
            })?,
            None => Environment::Development,
        };

        Ok(Self {
            gateway: GatewayConfig {
                base_url: get("SUPERMARKET_API_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                token: get("SUPERMARKET_API_TOKEN"),
                timeout: Duration::from_secs(timeout_secs),
                concurrency_limit,
            },
            concurrency_limit,
            schedule_interval: Duration::from_secs(schedule_secs),
            health_check_interval: (health_secs > 0).then(|| Duration::from_secs(health_secs)),
            run_on_startup,
            environment,
            redis_url: get("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            http_port: parse_or(&get, "HTTP_PORT", DEFAULT_HTTP_PORT)?,
            metrics_port: parse_or(&get, "METRICS_PORT", DEFAULT_METRICS_PORT)?,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key: key.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
