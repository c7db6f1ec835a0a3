//! Product Fixtures

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, KRW, USD},
};
use serde::Deserialize;

use crate::{
    discounts::major_to_minor, fixtures::FixtureError, products::Product,
    tags::StringTagCollection,
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product id -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Product price (e.g., "25000 KRW")
    pub price: String,

    /// Product category
    pub category: String,

    /// Product tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ProductFixture {
    /// Convert to a [`Product`] with the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if the price cannot be parsed.
    pub fn into_product(self, id: String) -> Result<Product<'static>, FixtureError> {
        let (minor_units, currency) = parse_price(&self.price)?;

        let tag_refs: Vec<&str> = self.tags.iter().map(String::as_str).collect();

        Ok(Product {
            id,
            name: self.name,
            price: Money::from_minor(minor_units, currency),
            category: self.category,
            tags: StringTagCollection::from_strs(&tag_refs),
        })
    }
}

/// Parse price string (e.g., "25000 KRW" or "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if the amount
/// is not a decimal that fits the currency's minor units, or if the currency code is not
/// recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = match *currency_code {
        "KRW" => KRW,
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units =
        major_to_minor(amount, currency).map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}
