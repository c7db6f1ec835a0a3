//! Products

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

use crate::tags::StringTagCollection;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    /// Unique product id (e.g. `prod_101`)
    pub id: String,

    /// Product name
    pub name: String,

    /// Product price
    pub price: Money<'a, Currency>,

    /// Product category (e.g. `skincare`)
    pub category: String,

    /// Product tags
    pub tags: StringTagCollection,
}

/// Errors raised while building a catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// A product with this id is already in the catalog.
    #[error("duplicate product id: {0}")]
    DuplicateProduct(String),

    /// A product's currency differs from the catalog currency (product id, product currency, catalog currency).
    #[error("product {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(String, &'static str, &'static str),
}

/// Read-only product catalog used to resolve product ids.
///
/// Products are created once at load time and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    keys: FxHashMap<String, ProductKey>,
    currency: &'static Currency,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog in the given currency.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            products: SlotMap::with_key(),
            keys: FxHashMap::default(),
            currency,
        }
    }

    /// Create a catalog from a list of products.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] on duplicate ids or currency mismatches.
    pub fn with_products(
        products: impl IntoIterator<Item = Product<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(currency);

        for product in products {
            catalog.insert(product)?;
        }

        Ok(catalog)
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the id is taken or the price currency differs.
    pub fn insert(&mut self, product: Product<'a>) -> Result<ProductKey, CatalogError> {
        if self.keys.contains_key(&product.id) {
            return Err(CatalogError::DuplicateProduct(product.id));
        }

        let product_currency = product.price.currency();

        if product_currency != self.currency {
            return Err(CatalogError::CurrencyMismatch(
                product.id,
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let id = product.id.clone();
        let key = self.products.insert(product);

        self.keys.insert(id, key);

        Ok(key)
    }

    /// Look up a product by its id.
    pub fn get(&self, id: &str) -> Option<&Product<'a>> {
        self.keys
            .get(id)
            .and_then(|key| self.products.get(*key))
    }

    /// Look up a product key by its id.
    pub fn key(&self, id: &str) -> Option<ProductKey> {
        self.keys.get(id).copied()
    }

    /// Look up a product by its key.
    pub fn by_key(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.products.get(key)
    }

    /// Iterate over all products (in no particular order).
    pub fn iter(&self) -> impl Iterator<Item = &Product<'a>> {
        self.products.values()
    }

    /// Get the number of products in the catalog.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Get the currency of the catalog.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
