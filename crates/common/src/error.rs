//! Error types for shared types.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown supermarket chain: {0}")]
    UnknownChain(String),
}
