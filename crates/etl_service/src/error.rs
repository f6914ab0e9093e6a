//! Error types for the ETL service.

use thiserror::Error;

/// Errors that end a whole run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("An ETL run is already in progress")]
    AlreadyRunning,

    #[error("Chain discovery failed: {0}")]
    Discovery(#[from] source_gateway::Error),

    #[error("No supported chains to process")]
    NoChainsToProcess,
}

impl RunError {
    pub fn kind(&self) -> &'static str {
        match self {
            RunError::AlreadyRunning => "already_running",
            RunError::Discovery(_) => "discovery_failed",
            RunError::NoChainsToProcess => "no_chains",
        }
    }
}

/// Errors that end the processing of one chain.
#[derive(Error, Debug)]
pub enum ChainError {
    #[error(transparent)]
    Unsupported(#[from] normalizer::RegistryError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] persistence::PersistenceError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, RunError>;
