//! Product list persistence: one versioned JSON envelope in one durable slot.
//!
//! Stored shape (version 1):
//!
//! ```json
//! {"schema_version":1,"products":[{"id":"...","name":"Milk","price":4.99,"store":"Lidl","purchased":false}]}
//! ```
//!
//! A bare JSON array is the older unversioned layout. It is still read (extra
//! per-item fields such as `isNew`/`exiting` are dropped) and is rewritten as
//! version 1 on the next save. Anything else is rejected as a whole.

use crate::core::error::ShoplistError;
use crate::core::schemas::PRODUCTS_SCHEMA_VERSION;
use crate::core::storage::KeyValueStorage;
use crate::plugins::product::Product;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashSet;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    schema_version: u32,
    products: &'a [Product],
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    schema_version: u32,
    products: Vec<Product>,
}

pub fn encode_products(products: &[Product]) -> Result<String, ShoplistError> {
    let envelope = EnvelopeRef {
        schema_version: PRODUCTS_SCHEMA_VERSION,
        products,
    };
    Ok(serde_json::to_string(&envelope)?)
}

pub fn decode_products(raw: &str) -> Result<Vec<Product>, ShoplistError> {
    let value: JsonValue = serde_json::from_str(raw)
        .map_err(|e| ShoplistError::DecodeError(format!("not JSON: {e}")))?;

    match &value {
        JsonValue::Array(_) => {}
        JsonValue::Object(obj) => {
            let version = obj.get("schema_version").and_then(JsonValue::as_u64);
            if version != Some(u64::from(PRODUCTS_SCHEMA_VERSION)) {
                return Err(ShoplistError::DecodeError(format!(
                    "unsupported schema_version: {}",
                    obj.get("schema_version").cloned().unwrap_or(JsonValue::Null)
                )));
            }
        }
        other => {
            return Err(ShoplistError::DecodeError(format!(
                "unexpected top-level value: {}",
                json_kind(other)
            )));
        }
    }

    let products = if value.is_array() {
        serde_json::from_value::<Vec<Product>>(value)
            .map_err(|e| ShoplistError::DecodeError(format!("legacy list: {e}")))?
    } else {
        serde_json::from_value::<Envelope>(value)
            .map_err(|e| ShoplistError::DecodeError(format!("envelope: {e}")))?
            .products
    };

    let mut seen = HashSet::with_capacity(products.len());
    for product in &products {
        product.validate()?;
        if !seen.insert(product.id.as_str()) {
            return Err(ShoplistError::DecodeError(format!(
                "duplicate product id {}",
                product.id
            )));
        }
    }
    Ok(products)
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Reads and writes the whole product list under one key.
pub struct PersistenceGateway {
    storage: Box<dyn KeyValueStorage>,
    key: String,
}

impl PersistenceGateway {
    pub fn new(storage: Box<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Overwrite the slot with `products`.
    pub fn save(&self, products: &[Product]) -> Result<(), ShoplistError> {
        let payload = encode_products(products)?;
        self.storage.set_item(&self.key, &payload)
    }

    /// `Ok(None)` when the slot has never been written.
    pub fn load(&self) -> Result<Option<Vec<Product>>, ShoplistError> {
        match self.storage.get_item(&self.key)? {
            Some(raw) => decode_products(&raw).map(Some),
            None => Ok(None),
        }
    }

    pub fn clear(&self) -> Result<(), ShoplistError> {
        self.storage.remove_item(&self.key)
    }

    /// Where a payload that failed to decode is kept.
    pub fn rejected_key(&self) -> String {
        format!("{}.rejected", self.key)
    }

    /// Copy the raw slot to [`Self::rejected_key`] so the next save cannot
    /// destroy it. Returns false when the slot is empty.
    pub fn preserve_rejected(&self) -> Result<bool, ShoplistError> {
        match self.storage.get_item(&self.key)? {
            Some(raw) => {
                self.storage.set_item(&self.rejected_key(), &raw)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStorage;

    fn product(id: &str, name: &str, price: f64) -> Product {
        Product {
            id: id.into(),
            name: name.into(),
            price,
            store: "Lidl".into(),
            purchased: false,
        }
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let storage = MemoryStorage::new();
        let gateway = PersistenceGateway::new(Box::new(storage.clone()), "shoppingList");
        let mut items = vec![product("b", "Bread", 3.5), product("a", "Milk", 4.99)];
        items[1].purchased = true;

        gateway.save(&items).unwrap();
        assert_eq!(gateway.load().unwrap(), Some(items));

        let raw = storage.peek("shoppingList").unwrap();
        assert!(raw.starts_with("{\"schema_version\":1,"));
    }

    #[test]
    fn test_load_absent_slot_is_none() {
        let gateway = PersistenceGateway::new(Box::new(MemoryStorage::new()), "shoppingList");
        assert_eq!(gateway.load().unwrap(), None);
    }

    #[test]
    fn test_decode_legacy_array_drops_transient_flags() {
        let raw = r#"[
            {"id":"1733000000000","name":"Milk","price":4.99,"store":"Lidl","purchased":true,"isNew":false,"exiting":true},
            {"id":"1732999999999","name":"Bread","price":3,"store":"Żabka"}
        ]"#;
        let products = decode_products(raw).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, "1733000000000");
        assert!(products[0].purchased);
        assert!(!products[1].purchased);
        assert_eq!(products[1].price, 3.0);

        let reencoded = encode_products(&products).unwrap();
        assert!(!reencoded.contains("exiting"));
        assert!(!reencoded.contains("isNew"));
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let err = decode_products(r#"{"schema_version":2,"products":[]}"#).unwrap_err();
        assert!(matches!(err, ShoplistError::DecodeError(_)));
        let err = decode_products(r#"{"products":[]}"#).unwrap_err();
        assert!(matches!(err, ShoplistError::DecodeError(_)));
    }

    #[test]
    fn test_decode_rejects_duplicate_ids() {
        let raw = r#"{"schema_version":1,"products":[
            {"id":"x","name":"A","price":1,"store":"S","purchased":false},
            {"id":"x","name":"B","price":2,"store":"S","purchased":false}
        ]}"#;
        let err = decode_products(raw).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_decode_rejects_partial_data() {
        // A NaN price was serialized as null by the old app.
        let raw = r#"[{"id":"1","name":"A","price":null,"store":"S"}]"#;
        assert!(decode_products(raw).is_err());
        let raw = r#"{"schema_version":1,"products":[],"extra":true}"#;
        assert!(decode_products(raw).is_err());
        assert!(decode_products("\"hello\"").is_err());
        assert!(decode_products("{not json").is_err());
    }

    #[test]
    fn test_preserve_rejected_copies_raw_slot() {
        let storage = MemoryStorage::new();
        let gateway = PersistenceGateway::new(Box::new(storage.clone()), "shoppingList");
        assert!(!gateway.preserve_rejected().unwrap());

        let raw = r#"[{"id":"1","name":"A","price":null,"store":"S"}]"#;
        storage.set_item("shoppingList", raw).unwrap();
        assert!(gateway.preserve_rejected().unwrap());
        assert_eq!(storage.peek("shoppingList.rejected").as_deref(), Some(raw));
        assert_eq!(storage.peek("shoppingList").as_deref(), Some(raw));
    }

    #[test]
    fn test_clear_removes_slot() {
        let gateway = PersistenceGateway::new(Box::new(MemoryStorage::new()), "k");
        gateway.save(&[product("a", "A", 1.0)]).unwrap();
        gateway.clear().unwrap();
        assert_eq!(gateway.load().unwrap(), None);
    }
}
