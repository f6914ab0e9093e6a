//! Raw Shufersal row layouts.
//!
//! Shufersal publishes flat rows with every field as a string; numbers are
//! still accepted since the feed has switched encodings before.

use crate::coerce::{decimal, identifier};
use common::coerce::string_or_number;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ShufersalProduct {
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

#[derive(Debug, Clone, Deserialize)]
pub struct ShufersalStore {
    #[serde(deserialize_with = "identifier")]
    pub chainid: String,
    #[serde(deserialize_with = "string_or_number")]
    pub lastupdatedate: String,
    #[serde(deserialize_with = "string_or_number")]
    pub subchainid: String,
    #[serde(deserialize_with = "identifier")]
    pub storeid: String,
    #[serde(deserialize_with = "string_or_number")]
    pub storetype: String,
    pub chainname: String,
    pub subchainname: String,
    pub storename: String,
    pub address: String,
    pub city: String,
    #[serde(deserialize_with = "string_or_number")]
    pub zipcode: String,
}
