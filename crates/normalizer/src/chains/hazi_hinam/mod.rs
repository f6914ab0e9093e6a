//! Hazi Hinam chain adapter.

mod adapter;
pub mod schema;

pub use adapter::HaziHinamAdapter;
