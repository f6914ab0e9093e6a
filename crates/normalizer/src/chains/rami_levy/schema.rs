//! Raw Rami Levy row layouts. The item name column is `itemnm`.

use crate::coerce::{decimal, identifier};
use common::coerce::{optional_string_or_number, string_or_number};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RamiLevyProduct {
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
    pub itemnm: String,
    pub manufacturername: String,
    pub manufacturecountry: String,
    pub manufactureritemdescription: String,
    pub unitqty: String,
    #[serde(deserialize_with = "decimal")]
    pub quantity: Decimal,
    pub unitofmeasure: String,
    #[serde(deserialize_with = "string_or_number")]
    pub bisweighted: String,
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

#[derive(Debug, Clone, Deserialize)]
pub struct RamiLevyStore {
    #[serde(deserialize_with = "identifier")]
    pub chainid: String,
    #[serde(deserialize_with = "string_or_number")]
    pub subchainid: String,
    #[serde(deserialize_with = "identifier")]
    pub storeid: String,
    #[serde(deserialize_with = "string_or_number")]
    pub bikoretno: String,
    pub storename: String,
    pub address: String,
    /// Numeric city code (e.g. 5000 for Tel Aviv).
    #[serde(deserialize_with = "string_or_number")]
    pub city: String,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub zipcode: Option<String>,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub lastupdate: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub storetype: String,
}
