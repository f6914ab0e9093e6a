//! Supermarket price ETL service.
//!
//! Pulls raw store and price dumps from the upstream scraper service,
//! validates and normalizes them per chain, and upserts the result with an
//! append-only price history.
//!
//! - [`orchestrator`]: one run over every supported chain
//! - [`scheduler`]: periodic runs and the upstream health monitor
//! - [`api`]: health endpoint and manual trigger
//! - [`config`]: environment configuration

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod orchestrator;
pub mod scheduler;

pub use api::{create_router, AppState};
pub use config::{EtlConfig, Environment};
pub use error::{ChainError, ConfigError, RunError};
pub use guard::{RunGuard, RunPermit};
pub use orchestrator::{ChainReport, Orchestrator, RunReport};
