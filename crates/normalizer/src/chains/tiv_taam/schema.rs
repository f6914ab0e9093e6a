//! Raw Tiv Taam row layouts.
//!
//! Store rows wrap their fields in a `store` object:
//!
//! ```text
//! { "store": { "chainid": "7290873255550", "storeid": "6", ... } }
//! ```

use crate::coerce::{decimal, identifier};
use common::coerce::{optional_string_or_number, string_or_number};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TivTaamProduct {
    #[serde(deserialize_with = "identifier")]
    pub chainid: String,
    #[serde(deserialize_with = "string_or_number")]
    pub subchainid: String,
    #[serde(deserialize_with = "identifier")]
    pub storeid: String,
    #[serde(deserialize_with = "string_or_number")]
    pub bikoretno: String,
    #[serde(deserialize_with = "string_or_number")]
    pub priceupdatedate: String,
    #[serde(deserialize_with = "identifier")]
    pub itemcode: String,
    #[serde(deserialize_with = "string_or_number")]
    pub itemtype: String,
    pub itemname: String,
    pub manufacturername: String,
    pub manufacturecountry: String,
    pub manufactureritemdescription: String,
    pub unitqty: String,
    #[serde(deserialize_with = "decimal")]
    pub quantity: Decimal,
    #[serde(deserialize_with = "string_or_number")]
    pub bisweighted: String,
    pub unitofmeasure: String,
    #[serde(deserialize_with = "string_or_number")]
    pub qtyinpackage: String,
    #[serde(deserialize_with = "decimal")]
    pub itemprice: Decimal,
    #[serde(deserialize_with = "decimal")]
    pub unitofmeasureprice: Decimal,
    #[serde(deserialize_with = "string_or_number")]
    pub allowdiscount: String,
    #[serde(deserialize_with = "string_or_number")]
    pub itemstatus: String,
}

/// Contents of the `store` object.
#[derive(Debug, Clone, Deserialize)]
pub struct TivTaamStore {
    #[serde(deserialize_with = "identifier")]
    pub chainid: String,
    pub chainname: String,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub lastupdatedate: Option<String>,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub lastupdatetime: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub subchainid: String,
    #[serde(deserialize_with = "string_or_number")]
    pub subchainname: String,
    #[serde(deserialize_with = "identifier")]
    pub storeid: String,
    #[serde(deserialize_with = "string_or_number")]
    pub bikoretno: String,
    #[serde(deserialize_with = "string_or_number")]
    pub storetype: String,
    pub storename: String,
    pub address: String,
    #[serde(deserialize_with = "string_or_number")]
    pub city: String,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub zipcode: Option<String>,
}
