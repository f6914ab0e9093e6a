//! Shufersal chain adapter implementation.

use super::schema::{ShufersalProduct, ShufersalStore};
use crate::schema::{UniformItem, UniformStore};
use crate::traits::ChainAdapter;
use common::SupermarketChain;

#[derive(Debug, Default, Clone)]
pub struct ShufersalAdapter;

impl ShufersalAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ChainAdapter for ShufersalAdapter {
    const CHAIN: SupermarketChain = SupermarketChain::Shufersal;
    type Store = ShufersalStore;
    type Product = ShufersalProduct;

    fn map_store(&self, store: ShufersalStore) -> UniformStore {
        UniformStore {
            chain_id: store.chainid,
            store_id: store.storeid,
            name: store.storename,
            address: store.address,
            city: store.city,
            zip_code: store.zipcode,
        }
    }

    fn map_product(&self, product: ShufersalProduct) -> UniformItem {
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

// ============================================================================
// Tests
// ============================================================================
