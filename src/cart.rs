//! Cart

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    pricing::{TotalPriceError, total_price},
    products::Product,
};

/// Errors related to cart construction or mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// A product's currency differs from the cart currency (product id, product currency, cart currency).
    #[error("product {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(String, &'static str, &'static str),

    /// Quantities added to a cart must be positive.
    #[error("cannot add zero units of product {0}")]
    ZeroQuantity(String),

    /// Merging into an existing line would exceed the maximum line quantity.
    #[error("quantity of product {0} overflows")]
    QuantityOverflow(String),
}

/// A product in the cart together with how many units of it are being bought.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine<'a> {
    /// The product being bought
    pub product: Product<'a>,

    /// Number of units (always positive while the line exists)
    pub quantity: u32,
}

impl<'a> CartLine<'a> {
    /// Create a new cart line.
    pub fn new(product: Product<'a>, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// Id of the product on this line.
    pub fn product_id(&self) -> &str {
        &self.product.id
    }
}

/// Cart
///
/// Holds at most one line per product id; adding a product that is already in the
/// cart merges into the existing line.
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    lines: Vec<CartLine<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create a new, empty cart.
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Create a new cart with the given lines, merging repeated products.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if a line has a zero quantity or a different currency.
    pub fn with_lines(
        lines: impl IntoIterator<Item = CartLine<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let mut cart = Self::new(currency);

        for line in lines {
            cart.add_quantity(line.product, line.quantity)?;
        }

        Ok(cart)
    }

    /// Add a single unit of a product.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if the product's currency differs from the cart's.
    pub fn add(&mut self, product: Product<'a>) -> Result<(), CartError> {
        self.add_quantity(product, 1)
    }

    /// Add `quantity` units of a product, merging with any existing line.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if `quantity` is zero, the product's currency differs
    /// from the cart's, or the merged quantity overflows.
    pub fn add_quantity(&mut self, product: Product<'a>, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity(product.id));
        }

        let product_currency = product.price.currency();

        if product_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                product.id,
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        match self.line_mut(&product.id) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CartError::QuantityOverflow(product.id))?;
            }
            None => self.lines.push(CartLine::new(product, quantity)),
        }

        Ok(())
    }

    /// Set the quantity of an existing line. A quantity of zero removes the line.
    ///
    /// Returns `false` if the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: &str, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product_id).is_some();
        }

        match self.line_mut(product_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove the line for a product, returning it if it was present.
    pub fn remove(&mut self, product_id: &str) -> Option<CartLine<'a>> {
        let pos = self
            .lines
            .iter()
            .position(|line| line.product_id() == product_id)?;

        Some(self.lines.remove(pos))
    }

    /// Find the line for a product.
    pub fn line(&self, product_id: &str) -> Option<&CartLine<'a>> {
        self.lines.iter().find(|line| line.product_id() == product_id)
    }

    fn line_mut(&mut self, product_id: &str) -> Option<&mut CartLine<'a>> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id() == product_id)
    }

    /// The cart lines, in the order products were first added.
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Sum of all line quantities.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Calculate the subtotal of the cart (sum of price × quantity).
    ///
    /// # Errors
    ///
    /// Returns a `TotalPriceError` if there was a money arithmetic or currency mismatch error.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, TotalPriceError> {
        total_price(&self.lines, self.currency)
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{
        Money,
        iso::{GBP, KRW},
    };
    use testresult::TestResult;

    use crate::tags::StringTagCollection;

    use super::*;

    fn product(id: &str, minor: i64) -> Product<'static> {
        Product {
            id: id.to_string(),
            name: id.to_string(),
            price: Money::from_minor(minor, KRW),
            category: "skincare".to_string(),
            tags: StringTagCollection::empty(),
        }
    }

    #[test]
    fn add_merges_repeated_products() -> TestResult {
        let mut cart = Cart::new(KRW);

        cart.add(product("prod_101", 25_000))?;
        cart.add(product("prod_102", 2_000))?;
        cart.add(product("prod_101", 25_000))?;

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.line("prod_101").map(|l| l.quantity), Some(2));
        assert_eq!(cart.item_count(), 3);

        Ok(())
    }

    #[test]
    fn with_lines_merges_and_keeps_first_seen_order() -> TestResult {
        let cart = Cart::with_lines(
            [
                CartLine::new(product("prod_102", 2_000), 1),
                CartLine::new(product("prod_101", 25_000), 2),
                CartLine::new(product("prod_102", 2_000), 4),
            ],
            KRW,
        )?;

        let ids: Vec<_> = cart.lines().iter().map(CartLine::product_id).collect();

        assert_eq!(ids, ["prod_102", "prod_101"]);
        assert_eq!(cart.line("prod_102").map(|l| l.quantity), Some(5));

        Ok(())
    }

    #[test]
    fn set_quantity_zero_removes_line() -> TestResult {
        let mut cart = Cart::new(KRW);
        cart.add_quantity(product("prod_101", 25_000), 3)?;

        assert!(cart.set_quantity("prod_101", 1));
        assert_eq!(cart.line("prod_101").map(|l| l.quantity), Some(1));

        assert!(cart.set_quantity("prod_101", 0));
        assert!(cart.is_empty());

        assert!(!cart.set_quantity("prod_101", 2));

        Ok(())
    }

    #[test]
    fn remove_returns_removed_line() -> TestResult {
        let mut cart = Cart::new(KRW);
        cart.add(product("prod_101", 25_000))?;

        assert_eq!(cart.remove("prod_101").map(|l| l.quantity), Some(1));
        assert!(cart.remove("prod_101").is_none());

        Ok(())
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut cart = Cart::new(KRW);

        assert_eq!(
            cart.add_quantity(product("prod_101", 25_000), 0),
            Err(CartError::ZeroQuantity("prod_101".to_string()))
        );
    }

    #[test]
    fn merging_past_max_quantity_is_rejected() -> TestResult {
        let mut cart = Cart::new(KRW);

        cart.add_quantity(product("prod_101", 25_000), u32::MAX)?;

        assert_eq!(
            cart.add(product("prod_101", 25_000)),
            Err(CartError::QuantityOverflow("prod_101".to_string()))
        );
        assert_eq!(cart.line("prod_101").map(|l| l.quantity), Some(u32::MAX));

        Ok(())
    }

    #[test]
    fn currency_mismatch_is_rejected() {
        let mut cart = Cart::new(GBP);

        assert_eq!(
            cart.add(product("prod_101", 25_000)),
            Err(CartError::CurrencyMismatch("prod_101".to_string(), "KRW", "GBP"))
        );
    }

    #[test]
    fn subtotal_with_lines() -> TestResult {
        let mut cart = Cart::new(KRW);
        cart.add_quantity(product("prod_101", 10_000), 2)?;

        assert_eq!(cart.subtotal()?, Money::from_minor(20_000, KRW));

        Ok(())
    }

    #[test]
    fn subtotal_with_no_lines() -> TestResult {
        let cart = Cart::new(KRW);

        assert_eq!(cart.subtotal()?, Money::from_minor(0, KRW));

        Ok(())
    }
}
