//! Hazi Hinam chain adapter implementation.

use super::schema::{HaziHinamProduct, HaziHinamStore};
use crate::schema::{UniformItem, UniformStore};
use crate::traits::ChainAdapter;
use common::SupermarketChain;

#[derive(Debug, Default, Clone)]
pub struct HaziHinamAdapter;

impl HaziHinamAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ChainAdapter for HaziHinamAdapter {
    const CHAIN: SupermarketChain = SupermarketChain::HaziHinam;
    type Store = HaziHinamStore;
    type Product = HaziHinamProduct;

    fn map_store(&self, store: HaziHinamStore) -> UniformStore {
        UniformStore {
            chain_id: store.chainid,
            store_id: store.storeid,
            name: store.storename,
            address: store.address,
            city: store.city,
            zip_code: store.zipcode.unwrap_or_default(),
        }
    }

    fn map_product(&self, product: HaziHinamProduct) -> UniformItem {
        UniformItem {
            chain_id: product.chainid,
            store_id: product.storeid,
            item_code: product.itemcode,
            item_name: product.itemname,
            manufacturer_name: product.manufacturename,
            manufacture_country: product.manufacturecountry,
            item_price: product.itemprice,
            item_quantity: product.quantity,
            item_unit_of_measure: product.unitofmeasure,
            item_unit_of_measure_price: product.unitofmeasureprice,
            item_status: product.itemstatus,
            update_date: product.priceupdatetime,
        }
    }
}
