//! Rami Levy chain adapter.

mod adapter;
pub mod schema;

pub use adapter::RamiLevyAdapter;
