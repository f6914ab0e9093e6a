//! Tiv Taam chain adapter.

mod adapter;
pub mod schema;

pub use adapter::TivTaamAdapter;
