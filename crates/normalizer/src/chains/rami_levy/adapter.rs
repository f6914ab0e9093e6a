//! Rami Levy chain adapter implementation.

use super::schema::{RamiLevyProduct, RamiLevyStore};
use crate::schema::{UniformItem, UniformStore};
use crate::traits::ChainAdapter;
use common::SupermarketChain;

#[derive(Debug, Default, Clone)]
pub struct RamiLevyAdapter;

impl RamiLevyAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ChainAdapter for RamiLevyAdapter {
    const CHAIN: SupermarketChain = SupermarketChain::RamiLevy;
    type Store = RamiLevyStore;
    type Product = RamiLevyProduct;

    fn map_store(&self, store: RamiLevyStore) -> UniformStore {
        UniformStore {
            chain_id: store.chainid,
            store_id: store.storeid,
            name: store.storename,
            address: store.address,
            city: store.city,
            zip_code: store.zipcode.unwrap_or_default(),
        }
    }

    fn map_product(&self, product: RamiLevyProduct) -> UniformItem {
        UniformItem {
            chain_id: product.chainid,
            store_id: product.storeid,
            item_code: product.itemcode,
            item_name: product.itemnm,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ChainTransformer;
    use common::RawRow;
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use std::str::FromStr;

    fn row(index: &str, content: Value) -> RawRow {
        let Value::Object(map) = content else {
            panic!("row content must be an object");
        };
        RawRow::new(index, "PriceFull", "PriceFull7290058140886-001-202504040524.xml", map)
    }

    fn eggs() -> Value {
        json!({
            "chainid": "7290058140886",
            "subchainid": "0",
            "storeid": "001",
            "bikoretno": "001",
            "priceupdatedate": "202504040524",
            "itemcode": "7290000000003",
            "itemtype": "1",
            "itemnm": "ביצים גדולות",
            "manufacturername": "תנובה",
            "manufacturecountry": "ישראל",
            "manufactureritemdescription": "ביצים גדולות",
            "unitqty": "12",
            "quantity": "12",
            "unitofmeasure": "יחידה",
            "bisweighted": "0",
            "qtyinpackage": "1",
            "itemprice": "15.90",
            "unitofmeasureprice": "1.33",
            "allowdiscount": "1",
            "itemstatus": "1"
        })
    }

    #[test]
    fn test_itemnm_maps_to_item_name() {
        let items = RamiLevyAdapter::new().transform_product_data(&[row("3", eggs())]);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_name, "ביצים גדולות");
        assert_eq!(items[0].item_quantity, Decimal::from(12));
        assert_eq!(items[0].item_unit_of_measure_price, Decimal::from_str("1.33").unwrap());
    }

    #[test]
    fn test_itemname_alone_is_not_enough() {
        let mut content = eggs();
        let map = content.as_object_mut().unwrap();
        let name = map.remove("itemnm").unwrap();
        map.insert("itemname".to_string(), name);

        let err = RamiLevyAdapter::new()
            .validate_product(&row("3", content))
            .unwrap_err();
        assert!(err.message.contains("itemnm"));
        assert_eq!(err.file_name, "PriceFull7290058140886-001-202504040524.xml");
    }

    #[test]
    fn test_store_city_code() {
        let content = json!({
            "chainid": "7290058140886",
            "subchainid": "0",
            "storeid": "001",
            "bikoretno": "001",
            "storename": "RAMI LEVY - TEL AVIV",
            "address": "ROTHSCHILD 45",
            "city": 5000,
            "zipcode": "6688116",
            "lastupdate": "202504040524",
            "storetype": "1"
        });

        let stores = RamiLevyAdapter::new().transform_store_data(&[row("0", content)]);
        assert_eq!(stores[0].city, "5000");
        assert_eq!(stores[0].zip_code, "6688116");
    }
}
