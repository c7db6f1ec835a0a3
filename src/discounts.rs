//! Discounts
//!
//! Minor-unit arithmetic shared by the promotion actions.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::iso::Currency;
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// An amount could not be represented in minor units.
    #[error("amount {0} cannot be represented in minor units")]
    AmountConversion(Decimal),
}

/// Build a [`Percentage`] from percent points (e.g. `10` for 10%).
pub fn percentage_from_points(points: Decimal) -> Percentage {
    Percentage::from(points / Decimal::ONE_HUNDRED)
}

/// Calculate the amount in minor units for a percentage of a minor unit amount.
///
/// Rounds half away from zero to the nearest minor unit.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the result overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // `Percentage` does not expose its inner `Decimal`
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Convert a major-unit amount (e.g. `12.50` GBP) into minor units of `currency`.
///
/// # Errors
///
/// Returns [`DiscountError::AmountConversion`] if the amount does not fit in an `i64`.
pub fn major_to_minor(amount: Decimal, currency: &Currency) -> Result<i64, DiscountError> {
    let scale = 10_i64
        .checked_pow(currency.exponent)
        .and_then(Decimal::from_i64)
        .ok_or(DiscountError::AmountConversion(amount))?;

    amount
        .checked_mul(scale)
        .map(|minor| minor.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|minor| minor.to_i64())
        .ok_or(DiscountError::AmountConversion(amount))
}

/// Convert minor units of `currency` into a major-unit decimal.
pub fn minor_to_major(minor: i64, currency: &Currency) -> Decimal {
    Decimal::new(minor, currency.exponent)
}
