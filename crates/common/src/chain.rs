//! Supermarket chain identifiers.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chains the pipeline has a transformer for.
///
/// The upstream service reports a superset of these; anything else is
/// ignored at discovery time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupermarketChain {
    Shufersal,
    HaziHinam,
    RamiLevy,
    TivTaam,
}

impl SupermarketChain {
    /// Every chain with a known schema, in processing order.
    pub const ALL: [SupermarketChain; 4] = [
        SupermarketChain::Shufersal,
        SupermarketChain::HaziHinam,
        SupermarketChain::RamiLevy,
        SupermarketChain::TivTaam,
    ];

    /// Identifier used by the upstream service (e.g. "HAZI_HINAM").
    pub fn as_str(&self) -> &'static str {
        match self {
            SupermarketChain::Shufersal => "SHUFERSAL",
            SupermarketChain::HaziHinam => "HAZI_HINAM",
            SupermarketChain::RamiLevy => "RAMI_LEVY",
            SupermarketChain::TivTaam => "TIV_TAAM",
        }
    }
}

impl fmt::Display for SupermarketChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SupermarketChain {
    type Err = Error;

    /// Case-insensitive; `-` and spaces are treated as `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();

        SupermarketChain::ALL
            .into_iter()
            .find(|chain| chain.as_str() == normalized)
            .ok_or_else(|| Error::UnknownChain(s.to_string()))
    }
}
