//! Tiv Taam chain adapter implementation.

use super::schema::{TivTaamProduct, TivTaamStore};
use crate::error::{RowKind, ValidationError};
use crate::schema::{UniformItem, UniformStore};
use crate::traits::{decode_content, ChainAdapter};
use common::{RawRow, SupermarketChain};
use serde_json::Value;

#[derive(Debug, Default, Clone)]
pub struct TivTaamAdapter;

impl TivTaamAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ChainAdapter for TivTaamAdapter {
    const CHAIN: SupermarketChain = SupermarketChain::TivTaam;
    type Store = TivTaamStore;
    type Product = TivTaamProduct;

    /// Reads the nested `store` object; a flat row is accepted too.
    fn validate_store(&self, row: &RawRow) -> Result<TivTaamStore, ValidationError> {
        match row.row_content.get("store") {
            Some(Value::Object(nested)) => decode_content(Self::CHAIN, RowKind::Store, row, nested),
            Some(other) => Err(ValidationError::new(
                Self::CHAIN,
                RowKind::Store,
                row,
                format!("`store` must be an object, found {}", other),
            )),
            None => decode_content(Self::CHAIN, RowKind::Store, row, &row.row_content),
        }
    }

    fn map_store(&self, store: TivTaamStore) -> UniformStore {
        UniformStore {
            chain_id: store.chainid,
            store_id: store.storeid,
            name: store.storename,
            address: store.address,
            city: store.city,
            zip_code: store.zipcode.unwrap_or_default(),
        }
    }

    fn map_product(&self, product: TivTaamProduct) -> UniformItem {
        UniformItem {
            chain_id: product.chainid,
            store_id: product.storeid,
            item_code: product.itemcode,
            item_name: product.itemname,
            manufacturer_name: product.manufacturername,
            manufacture_country: product.manufacturecountry,
            item_price: product.itemprice,
            item_quantity: product.quantity,
            item_unit_of_measure: product.unitofmeasure,
            item_unit_of_measure_price: product.unitofmeasureprice,
            item_status: product.itemstatus,
            update_date: product.priceupdatedate,
        }
    }
}
