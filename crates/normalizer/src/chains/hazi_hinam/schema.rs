//! Raw Hazi Hinam row layouts.
//!
//! Product files spell the manufacturer field `manufacturename` and carry
//! `priceupdatetime` instead of `priceupdatedate`. Most scalars arrive as JSON
//! numbers.

use crate::coerce::{decimal, identifier};
use common::coerce::{optional_string_or_number, string_or_number};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct HaziHinamProduct {
    #[serde(deserialize_with = "identifier")]
    pub chainid: String,
    #[serde(deserialize_with = "string_or_number")]
    pub subchainid: String,
    #[serde(deserialize_with = "identifier")]
    pub storeid: String,
    #[serde(deserialize_with = "string_or_number")]
    pub bikoretno: String,
    pub priceupdatetime: String,
    #[serde(deserialize_with = "identifier")]
    pub itemcode: String,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub lastsaledatetime: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub itemtype: String,
    pub itemname: String,
    pub manufacturename: String,
    pub manufacturecountry: String,
    pub manufactureitemdescription: String,
    pub unitqty: String,
    #[serde(deserialize_with = "decimal")]
    pub quantity: Decimal,
    pub unitofmeasure: String,
    #[serde(deserialize_with = "string_or_number")]
    pub bisweighted: String,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub qtyinpackage: Option<String>,
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
pub struct HaziHinamStore {
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
    #[serde(deserialize_with = "string_or_number")]
    pub city: String,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub zipcode: Option<String>,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub lastupdate: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub storetype: String,
}
