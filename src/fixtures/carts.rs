//! Cart Fixtures

use serde::Deserialize;

/// Cart in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart lines; repeated products are merged when the cart is built
    pub lines: Vec<CartLineFixture>,
}

/// Cart line in YAML
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// Product id
    pub product: String,

    /// Units of the product, one if omitted
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}
