//! Uniform store and item schemas shared by every chain.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Store record in the chain-independent format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UniformStore {
    /// Chain's global location number (e.g. "7290027600007").
    pub chain_id: String,
    /// Source-native store id, unique within the chain.
    pub store_id: String,
    pub name: String,
    pub address: String,
    /// Some chains publish a numeric city code instead of a name.
    pub city: String,
    /// Empty when the source omits it.
    pub zip_code: String,
}

/// Price row in the chain-independent format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UniformItem {
    pub chain_id: String,
    pub store_id: String,
    /// Barcode; identifies the product across chains.
    pub item_code: String,
    pub item_name: String,
    pub manufacturer_name: String,
    pub manufacture_country: String,
    pub item_price: Decimal,
    pub item_quantity: Decimal,
    pub item_unit_of_measure: String,
    pub item_unit_of_measure_price: Decimal,
    pub item_status: String,
    /// Source timestamp of the price, verbatim.
    pub update_date: String,
}
