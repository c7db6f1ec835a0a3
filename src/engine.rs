//! Promotion Engine
//!
//! [`apply_promotions`] prices a cart in one pass: snapshot the cart, select and order the
//! applicable promotions, then run them through the stacking fold.
//!
//! [`PromotionEngine`] keeps a cart, a user and a promotion set together and reprices the
//! cart from scratch after every change.

use rusty_money::Money;
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::{Cart, CartError},
    conditions::CartSnapshot,
    products::Catalog,
    promotions::{
        Promotion,
        applicability::select_applicable,
        registry::{PromotionRegistry, RegistryError},
    },
    receipt::PricedCart,
    stacking::{ExecutionError, execute},
    users::UserProfile,
};

/// Errors raised by [`PromotionEngine`] mutations.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// The product id is not in the catalog.
    #[error("unknown product: {0}")]
    UnknownProduct(String),

    /// Error changing the cart.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Error changing the promotion set.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Error pricing the cart.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// Price a cart for a user against a set of promotions.
///
/// `promotions` is in insertion order; that order breaks ties between equal priorities.
/// The catalog is only used to resolve gift products.
///
/// # Errors
///
/// Returns an [`ExecutionError`] if the subtotal or a line total overflows.
pub fn apply_promotions<'a>(
    cart: &Cart<'a>,
    user: &UserProfile,
    promotions: &[Promotion],
    catalog: &Catalog<'a>,
) -> Result<PricedCart<'a>, ExecutionError> {
    let snapshot = CartSnapshot::new(cart)?;
    let ordered = select_applicable(promotions, &snapshot, user);

    let priced = execute(&ordered, &snapshot, catalog)?;

    debug!(
        user_id = %user.id,
        lines = cart.len(),
        subtotal = %priced.subtotal(),
        final_total = %priced.final_total(),
        applied = priced.applied_promotions().len(),
        "priced cart"
    );

    Ok(priced)
}

/// A cart, user and promotion set that stay priced.
///
/// Every mutation reprices the cart and returns the new [`PricedCart`]. If a mutation
/// fails, the state is left as it was before the call.
#[derive(Debug, Clone)]
pub struct PromotionEngine<'a> {
    catalog: Catalog<'a>,
    user: UserProfile,
    cart: Cart<'a>,
    promotions: PromotionRegistry,
    priced: PricedCart<'a>,
}

impl<'a> PromotionEngine<'a> {
    /// Create an engine with an empty cart and no promotions.
    pub fn new(catalog: Catalog<'a>, user: UserProfile) -> Self {
        let cart = Cart::new(catalog.currency());
        let priced = PricedCart::undiscounted(Vec::new(), Money::from_minor(0, catalog.currency()));

        Self {
            catalog,
            user,
            cart,
            promotions: PromotionRegistry::new(),
            priced,
        }
    }

    /// Create an engine from existing state and price it.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the cart cannot be priced.
    pub fn from_parts(
        catalog: Catalog<'a>,
        user: UserProfile,
        cart: Cart<'a>,
        promotions: PromotionRegistry,
    ) -> Result<Self, EngineError> {
        let priced = apply_promotions(&cart, &user, promotions.as_slice(), &catalog)?;

        Ok(Self {
            catalog,
            user,
            cart,
            promotions,
            priced,
        })
    }

    /// Switch to a different user.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the cart cannot be priced.
    pub fn set_user(&mut self, user: UserProfile) -> Result<&PricedCart<'a>, EngineError> {
        let priced = apply_promotions(&self.cart, &user, self.promotions.as_slice(), &self.catalog)?;

        self.user = user;

        Ok(self.store(priced))
    }

    /// Add one unit of a catalog product to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownProduct`] if the product is not in the catalog.
    pub fn add_to_cart(&mut self, product_id: &str) -> Result<&PricedCart<'a>, EngineError> {
        let product = self
            .catalog
            .get(product_id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownProduct(product_id.to_string()))?;

        let mut cart = self.cart.clone();
        cart.add(product)?;

        self.reprice_cart(cart)
    }

    /// Remove a product's line from the cart. Removing a product that is not in the cart
    /// leaves the cart unchanged.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the cart cannot be priced.
    pub fn remove_from_cart(&mut self, product_id: &str) -> Result<&PricedCart<'a>, EngineError> {
        let mut cart = self.cart.clone();
        cart.remove(product_id);

        self.reprice_cart(cart)
    }

    /// Set the quantity of a product already in the cart. Zero removes the line; products
    /// not in the cart are ignored.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the cart cannot be priced.
    pub fn update_cart_item_quantity(
        &mut self,
        product_id: &str,
        quantity: u32,
    ) -> Result<&PricedCart<'a>, EngineError> {
        let mut cart = self.cart.clone();
        cart.set_quantity(product_id, quantity);

        self.reprice_cart(cart)
    }

    /// Register a promotion.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Registry`] if the id is already registered.
    pub fn add_promotion(&mut self, promotion: Promotion) -> Result<&PricedCart<'a>, EngineError> {
        let mut promotions = self.promotions.clone();
        promotions.add(promotion)?;

        self.reprice_promotions(promotions)
    }

    /// Replace a registered promotion, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Registry`] if no promotion has that id.
    pub fn replace_promotion(
        &mut self,
        promotion: Promotion,
    ) -> Result<&PricedCart<'a>, EngineError> {
        let mut promotions = self.promotions.clone();
        promotions.replace(promotion)?;

        self.reprice_promotions(promotions)
    }

    /// Unregister a promotion.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Registry`] if no promotion has that id.
    pub fn remove_promotion(&mut self, promotion_id: &str) -> Result<&PricedCart<'a>, EngineError> {
        let mut promotions = self.promotions.clone();

        if promotions.remove(promotion_id).is_none() {
            return Err(RegistryError::NotFound(promotion_id.to_string()).into());
        }

        self.reprice_promotions(promotions)
    }

    /// Reprice the cart without changing anything.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the cart cannot be priced.
    pub fn calculate(&mut self) -> Result<&PricedCart<'a>, EngineError> {
        let priced = apply_promotions(
            &self.cart,
            &self.user,
            self.promotions.as_slice(),
            &self.catalog,
        )?;

        Ok(self.store(priced))
    }

    /// The most recently priced cart.
    pub fn priced_cart(&self) -> &PricedCart<'a> {
        &self.priced
    }

    /// The current cart.
    pub fn cart(&self) -> &Cart<'a> {
        &self.cart
    }

    /// The current user.
    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    /// The registered promotions.
    pub fn promotions(&self) -> &PromotionRegistry {
        &self.promotions
    }

    /// The product catalog.
    pub fn catalog(&self) -> &Catalog<'a> {
        &self.catalog
    }

    fn reprice_cart(&mut self, cart: Cart<'a>) -> Result<&PricedCart<'a>, EngineError> {
        let priced = apply_promotions(&cart, &self.user, self.promotions.as_slice(), &self.catalog)?;

        self.cart = cart;

        Ok(self.store(priced))
    }

    fn reprice_promotions(
        &mut self,
        promotions: PromotionRegistry,
    ) -> Result<&PricedCart<'a>, EngineError> {
        let priced = apply_promotions(&self.cart, &self.user, promotions.as_slice(), &self.catalog)?;

        self.promotions = promotions;

        Ok(self.store(priced))
    }

    fn store(&mut self, priced: PricedCart<'a>) -> &PricedCart<'a> {
        self.priced = priced;

        &self.priced
    }
}
