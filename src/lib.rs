//! Rulecart
//!
//! Rulecart is a promotion evaluation engine for shopping carts: it decides which
//! declaratively defined promotions apply to a cart and user, orders them by priority,
//! and stacks their discounts into a priced cart.

pub mod cart;
pub mod cli;
pub mod conditions;
pub mod discounts;
pub mod engine;
pub mod fixtures;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod promotions;
pub mod receipt;
pub mod stacking;
pub mod tags;
pub mod users;
pub mod values;
