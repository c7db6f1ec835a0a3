//! Prices

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::cart::CartLine;

/// Errors that can occur while calculating total price.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// Multiplying a unit price by its quantity overflowed (product id).
    #[error("line total for product {0} overflowed")]
    Overflow(String),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculates `price × quantity` for a single cart line, in minor units.
///
/// # Errors
///
/// Returns [`TotalPriceError::Overflow`] if the product does not fit in an `i64`.
pub fn line_total_minor(line: &CartLine<'_>) -> Result<i64, TotalPriceError> {
    line.product
        .price
        .to_minor_units()
        .checked_mul(i64::from(line.quantity))
        .ok_or_else(|| TotalPriceError::Overflow(line.product.id.clone()))
}

/// Calculates the total price of a list of cart lines.
///
/// An empty list totals zero in `currency`.
///
/// # Errors
///
/// - [`TotalPriceError::Overflow`]: a line total overflowed.
/// - [`TotalPriceError::Money`]: wrapped money arithmetic or currency mismatch error.
pub fn total_price<'a>(
    lines: &[CartLine<'a>],
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, TotalPriceError> {
    lines
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, line| {
            let line_total = Money::from_minor(line_total_minor(line)?, line.product.price.currency());

            Ok(acc.add(line_total)?)
        })
}
