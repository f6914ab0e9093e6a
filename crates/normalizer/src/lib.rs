//! Normalization of raw supermarket rows into the uniform store/item format.
//!
//! Every chain publishes the same logical data with its own column names and
//! encodings. Each chain gets an adapter that validates its raw layout with
//! serde and maps it to [`UniformStore`] / [`UniformItem`]. Adapters are looked
//! up through the [`TransformerRegistry`].
//!
//! # Architecture
//!
//! ```text
//! RawRow --> ChainAdapter::validate_* --> ChainAdapter::map_* --> UniformStore / UniformItem
//!            (schema + coercion)           (field renames)
//! ```
//!
//! A row that fails validation is logged and dropped; the rest of the batch
//! continues.
//!
//! # Usage
//!
//! ```ignore
//! use normalizer::TransformerRegistry;
//! use common::SupermarketChain;
//!
//! let registry = TransformerRegistry::with_defaults();
//! let transformer = registry.get_transformer(SupermarketChain::Shufersal)?;
//! let items = transformer.transform_product_data(&raw_rows);
//! ```

pub mod chains;
pub mod coerce;
pub mod error;
pub mod registry;
pub mod schema;
pub mod traits;

pub use error::{RegistryError, RowKind, ValidationError};
pub use registry::TransformerRegistry;
pub use schema::{UniformItem, UniformStore};
pub use traits::{ChainAdapter, ChainTransformer, TransformReport};

pub use chains::{HaziHinamAdapter, RamiLevyAdapter, ShufersalAdapter, TivTaamAdapter};
