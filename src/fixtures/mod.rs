//! Fixtures

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::{Cart, CartError, CartLine},
    engine::{EngineError, PromotionEngine},
    fixtures::{
        carts::CartFixture, products::ProductsFixture, promotions::PromotionsFixture,
        users::UsersFixture,
    },
    products::{Catalog, CatalogError, Product},
    promotions::{
        Promotion,
        registry::{PromotionRegistry, RegistryError},
    },
    users::UserProfile,
};

pub mod carts;
pub mod products;
pub mod promotions;
pub mod users;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// User not found
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Invalid promotion data
    #[error("Invalid promotion data: {0}")]
    InvalidPromotionData(String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// No cart loaded
    #[error("No cart loaded")]
    NoCart,

    /// Catalog creation error
    #[error("Failed to build catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),

    /// Duplicate promotion ids
    #[error("Failed to register promotions: {0}")]
    Registry(#[from] RegistryError),

    /// Engine creation error
    #[error("Failed to create engine: {0}")]
    Engine(#[from] EngineError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Products, created once the first price fixes the currency
    catalog: Option<Catalog<'a>>,

    /// Users by id
    users: FxHashMap<String, UserProfile>,

    /// Cart built from catalog products
    cart: Option<Cart<'a>>,

    /// Promotions in file order
    promotions: Vec<Promotion>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: None,
            users: FxHashMap::default(),
            cart: None,
            promotions: Vec::new(),
        }
    }

    fn read(&self, category: &str, name: &str) -> Result<String, FixtureError> {
        let file_path = self.base_path.join(category).join(format!("{name}.yml"));

        debug!(path = %file_path.display(), "reading fixture");

        Ok(fs::read_to_string(&file_path)?)
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ProductsFixture = serde_norway::from_str(&self.read("products", name)?)?;

        for (id, product_fixture) in fixture.products {
            let product = product_fixture.into_product(id)?;
            let currency = product.price.currency();

            self.catalog
                .get_or_insert_with(|| Catalog::new(currency))
                .insert(product)?;
        }

        Ok(self)
    }

    /// Load users from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_users(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: UsersFixture = serde_norway::from_str(&self.read("users", name)?)?;

        for (id, user_fixture) in fixture.users {
            self.users
                .insert(id.clone(), user_fixture.into_profile(id));
        }

        Ok(self)
    }

    /// Load a cart from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if no products have been
    /// loaded, or if referenced products don't exist.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CartFixture = serde_norway::from_str(&self.read("carts", name)?)?;
        let catalog = self.catalog.as_ref().ok_or(FixtureError::NoCurrency)?;

        let lines = fixture
            .lines
            .into_iter()
            .map(|line| {
                catalog
                    .get(&line.product)
                    .cloned()
                    .map(|product| CartLine::new(product, line.quantity))
                    .ok_or(FixtureError::ProductNotFound(line.product))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.cart = Some(Cart::with_lines(lines, catalog.currency())?);

        Ok(self)
    }

    /// Load promotions from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if a promotion is invalid.
    pub fn load_promotions(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: PromotionsFixture = serde_norway::from_str(&self.read("promotions", name)?)?;

        for promotion_fixture in fixture.promotions {
            self.promotions.push(Promotion::try_from(promotion_fixture)?);
        }

        Ok(self)
    }

    /// Load products, users, cart and promotions with the same name
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn load_set(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        self.load_products(name)?
            .load_users(name)?
            .load_cart(name)?
            .load_promotions(name)
    }

    /// Load a complete fixture set from the default base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_set(name)?;

        Ok(fixture)
    }

    /// Get a product by id
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, id: &str) -> Result<&Product<'a>, FixtureError> {
        self.catalog
            .as_ref()
            .and_then(|catalog| catalog.get(id))
            .ok_or_else(|| FixtureError::ProductNotFound(id.to_string()))
    }

    /// Get a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not found.
    pub fn user(&self, id: &str) -> Result<&UserProfile, FixtureError> {
        self.users
            .get(id)
            .ok_or_else(|| FixtureError::UserNotFound(id.to_string()))
    }

    /// Get the product catalog
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn catalog(&self) -> Result<&Catalog<'a>, FixtureError> {
        self.catalog.as_ref().ok_or(FixtureError::NoCurrency)
    }

    /// Get the cart
    ///
    /// # Errors
    ///
    /// Returns an error if no cart has been loaded.
    pub fn cart(&self) -> Result<&Cart<'a>, FixtureError> {
        self.cart.as_ref().ok_or(FixtureError::NoCart)
    }

    /// Get all promotions, in file order
    pub fn promotions(&self) -> &[Promotion] {
        &self.promotions
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        Ok(self.catalog()?.currency())
    }

    /// Register the loaded promotions
    ///
    /// # Errors
    ///
    /// Returns an error if two promotions share an id.
    pub fn registry(&self) -> Result<PromotionRegistry, FixtureError> {
        Ok(PromotionRegistry::with_promotions(
            self.promotions.iter().cloned(),
        )?)
    }

    /// Build a priced engine for one of the loaded users
    ///
    /// An unloaded cart starts the engine empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the user or products are missing, promotion ids clash, or the
    /// cart cannot be priced.
    pub fn engine(&self, user_id: &str) -> Result<PromotionEngine<'a>, FixtureError> {
        let catalog = self.catalog()?.clone();
        let cart = match &self.cart {
            Some(cart) => cart.clone(),
            None => Cart::new(catalog.currency()),
        };

        Ok(PromotionEngine::from_parts(
            catalog,
            self.user(user_id)?.clone(),
            cart,
            self.registry()?,
        )?)
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}
