//! Error types for the source gateway.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Request to {endpoint} timed out ({context})")]
    Timeout { endpoint: String, context: String },

    #[error("Upstream returned 404 for {endpoint} ({context})")]
    NotFound { endpoint: String, context: String },

    #[error("Upstream returned status {status} for {endpoint} ({context}): {body}")]
    Status {
        endpoint: String,
        context: String,
        status: u16,
        body: String,
    },

    #[error("Connection to {endpoint} failed ({context}): {source}")]
    Connect {
        endpoint: String,
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response from {endpoint} ({context}): {message}")]
    Decode {
        endpoint: String,
        context: String,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Short label for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Timeout { .. } => "timeout",
            Error::NotFound { .. } => "not_found",
            Error::Status { .. } => "status",
            Error::Connect { .. } => "connect",
            Error::Http(_) => "http",
            Error::Decode { .. } => "decode",
            Error::InvalidConfig(_) => "config",
        }
    }

    /// A 404 for something the upstream just listed; usually a listing/fetch race.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Timeouts and connection failures.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Timeout { .. } | Error::Connect { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
