//! The product record and the rules for reading user input into one.

use crate::core::error::ShoplistError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Message shown when any of the three input fields is blank.
pub const EMPTY_FIELDS_MESSAGE: &str = "All fields must be filled in!";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub store: String,
    #[serde(default)]
    pub purchased: bool,
}

impl Product {
    /// Build a product from raw field input. Fails without side effects when a
    /// trimmed field is empty or the price is not a non-negative number.
    pub fn from_input(
        id: String,
        name: &str,
        price: &str,
        store: &str,
    ) -> Result<Self, ShoplistError> {
        let name = name.trim();
        let price = price.trim();
        let store = store.trim();
        if name.is_empty() || price.is_empty() || store.is_empty() {
            return Err(ShoplistError::ValidationError(EMPTY_FIELDS_MESSAGE.into()));
        }
        Ok(Self {
            id,
            name: name.to_string(),
            price: parse_price(price)?,
            store: store.to_string(),
            purchased: false,
        })
    }

    /// Check a record that came from outside (e.g. the durable slot).
    pub fn validate(&self) -> Result<(), ShoplistError> {
        if self.id.trim().is_empty() {
            return Err(ShoplistError::DecodeError("product with empty id".into()));
        }
        if self.name.trim().is_empty() || self.store.trim().is_empty() {
            return Err(ShoplistError::DecodeError(format!(
                "product {} has an empty name or store",
                self.id
            )));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ShoplistError::DecodeError(format!(
                "product {} has invalid price {}",
                self.id, self.price
            )));
        }
        Ok(())
    }

    pub fn matches(&self, query: &str) -> bool {
        query.is_empty() || self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

/// Accepts `4.99` and `4,99`. The first comma is read as the decimal point.
pub fn parse_price(input: &str) -> Result<f64, ShoplistError> {
    let trimmed = input.trim();
    let normalized = trimmed.replacen(',', ".", 1);
    let value: f64 = normalized.parse().map_err(|_| {
        ShoplistError::ValidationError(format!("price '{}' is not a number", trimmed))
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(ShoplistError::ValidationError(format!(
            "price '{}' must be a non-negative amount",
            trimmed
        )));
    }
    // -0 parses fine but prints as "-0.00"
    Ok(if value == 0.0 { 0.0 } else { value })
}

/// Accent-insensitive, lower-cased collation key.
///
/// Each entry is a base letter plus a rank. Accented forms fold to rank 0 of
/// their base. `ł`, `đ` and `ø` are letters of their own that sort right
/// after their base, so they get rank 1.
fn primary_key(s: &str) -> Vec<(char, u8)> {
    let mut out = Vec::with_capacity(s.len());
    for c in s.chars() {
        for lower in c.to_lowercase() {
            match lower {
                'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => out.push(('a', 0)),
                'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => out.push(('c', 0)),
                'ď' => out.push(('d', 0)),
                'đ' => out.push(('d', 1)),
                'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => out.push(('e', 0)),
                'ĝ' | 'ğ' | 'ġ' | 'ģ' => out.push(('g', 0)),
                'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'į' | 'ı' => out.push(('i', 0)),
                'ľ' | 'ĺ' | 'ļ' => out.push(('l', 0)),
                'ł' => out.push(('l', 1)),
                'ñ' | 'ń' | 'ņ' | 'ň' => out.push(('n', 0)),
                'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ō' | 'ő' => out.push(('o', 0)),
                'ø' => out.push(('o', 1)),
                'ŕ' | 'ř' => out.push(('r', 0)),
                'ś' | 'ŝ' | 'ş' | 'š' => out.push(('s', 0)),
                'ţ' | 'ť' => out.push(('t', 0)),
                'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ů' | 'ű' | 'ų' => out.push(('u', 0)),
                'ý' | 'ÿ' => out.push(('y', 0)),
                'ź' | 'ż' | 'ž' => out.push(('z', 0)),
                'ß' => out.extend([('s', 0), ('s', 0)]),
                'æ' => out.extend([('a', 0), ('e', 0)]),
                'œ' => out.extend([('o', 0), ('e', 0)]),
                other => out.push((other, 0)),
            }
        }
    }
    out
}

/// Locale-aware name ordering: base letters first, then accents, then case
/// (lower before upper), then raw code points as the final tie-break.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| {
            let case_a = a.chars().map(char::is_uppercase);
            let case_b = b.chars().map(char::is_uppercase);
            case_a.cmp(case_b)
        })
        .then_with(|| a.cmp(b))
}
