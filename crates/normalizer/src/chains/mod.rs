//! Per-chain adapters.

pub mod hazi_hinam;
pub mod rami_levy;
pub mod shufersal;
pub mod tiv_taam;

pub use hazi_hinam::HaziHinamAdapter;
pub use rami_levy::RamiLevyAdapter;
pub use shufersal::ShufersalAdapter;
pub use tiv_taam::TivTaamAdapter;
