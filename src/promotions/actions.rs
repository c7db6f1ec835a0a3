//! Promotion Actions
//!
//! What a promotion does once it applies. Each action kind carries only the fields it needs.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::Deserialize;
use smallvec::SmallVec;
use tracing::warn;

use crate::{
    cart::CartLine,
    conditions::CartSnapshot,
    discounts::{major_to_minor, percent_of_minor, percentage_from_points},
    pricing::line_total_minor,
    products::Catalog,
    stacking::ExecutionError,
    values::RuleValue,
};

/// How a tier's `value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierKind {
    /// Percent of the target line's total
    Percent,

    /// Flat amount in major units
    Fixed,
}

/// A quantity threshold for [`Action::TieredDiscount`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tier {
    /// Minimum units of the target product
    pub quantity: u32,

    /// Percent or flat amount
    pub kind: TierKind,

    /// Percent points or major-unit amount
    pub value: Decimal,
}

impl Tier {
    /// Percent-off tier.
    pub fn percent(quantity: u32, points: impl Into<Decimal>) -> Self {
        Self {
            quantity,
            kind: TierKind::Percent,
            value: points.into(),
        }
    }

    /// Flat-amount-off tier.
    pub fn fixed(quantity: u32, amount: impl Into<Decimal>) -> Self {
        Self {
            quantity,
            kind: TierKind::Fixed,
            value: amount.into(),
        }
    }
}

/// Promotion action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Take a percentage off the current running total.
    CartPercentDiscount {
        /// Percent points (e.g. `"10"`)
        percent: RuleValue,
    },

    /// Take a flat amount off the running total.
    CartFixedDiscount {
        /// Major-unit amount
        amount: RuleValue,
    },

    /// Take a flat amount off the running total on behalf of a product.
    ///
    /// The amount is resolved by the rule author, typically the product's price.
    ProductFixedDiscount {
        /// Major-unit amount
        amount: RuleValue,

        /// Product the discount was authored for
        product_id: Option<String>,
    },

    /// Discount a product's line by the highest quantity tier it reaches.
    TieredDiscount {
        /// Product whose line quantity selects the tier
        target_product_id: String,

        /// Quantity tiers
        tiers: SmallVec<[Tier; 3]>,
    },

    /// Give away a catalog product. No monetary effect.
    AddFreeProduct {
        /// Gift product id
        product_id: String,
    },

    /// Waive shipping. No monetary effect.
    FreeShipping,
}

/// Everything an action may look at besides the running total.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'s, 'a> {
    /// The cart being priced
    pub cart: &'s CartSnapshot<'s, 'a>,

    /// Catalog used to resolve gift products
    pub catalog: &'s Catalog<'a>,

    /// Currency amounts are expressed in
    pub currency: &'a Currency,
}

/// The effect of running one action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Amount taken off the running total, in minor units
    pub discount: i64,

    /// Whether the action had any effect, monetary or not
    pub applied: bool,

    /// Human readable detail for the applied promotion record
    pub description: Option<String>,
}

impl ActionOutcome {
    /// No effect.
    pub fn none() -> Self {
        Self::default()
    }

    /// A monetary discount.
    pub fn discount(discount: i64) -> Self {
        Self {
            discount,
            applied: true,
            description: None,
        }
    }

    /// A non-monetary benefit.
    pub fn benefit(description: impl Into<String>) -> Self {
        Self {
            discount: 0,
            applied: true,
            description: Some(description.into()),
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Action {
    /// Run the action against the current running total (minor units).
    ///
    /// Malformed or unrepresentable values and references to products that are missing
    /// from the cart or catalog produce [`ActionOutcome::none`] rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecutionError`] if the target line's total overflows.
    pub fn apply(
        &self,
        ctx: &ActionContext<'_, '_>,
        running_total: i64,
    ) -> Result<ActionOutcome, ExecutionError> {
        match self {
            Action::CartPercentDiscount { percent } => {
                let Some(points) = parse_value(percent, "percent") else {
                    return Ok(ActionOutcome::none());
                };

                let percent = percentage_from_points(points);

                Ok(percent_to_minor(&percent, running_total)
                    .map_or_else(ActionOutcome::none, ActionOutcome::discount))
            }
            Action::CartFixedDiscount { amount } | Action::ProductFixedDiscount { amount, .. } => {
                Ok(parse_value(amount, "amount")
                    .and_then(|amount| amount_to_minor(amount, ctx.currency))
                    .map_or_else(ActionOutcome::none, ActionOutcome::discount))
            }
            Action::TieredDiscount {
                target_product_id,
                tiers,
            } => {
                let Some(line) = ctx.cart.line(target_product_id) else {
                    return Ok(ActionOutcome::none());
                };

                let Some(tier) = select_tier(tiers, line.quantity) else {
                    return Ok(ActionOutcome::none());
                };

                tier_outcome(tier, line, ctx.currency)
            }
            Action::AddFreeProduct { product_id } => Ok(ctx
                .catalog
                .get(product_id)
                .map_or_else(ActionOutcome::none, |gift| {
                    ActionOutcome::benefit(format!("Gift: {}", gift.name))
                })),
            Action::FreeShipping => Ok(ActionOutcome::benefit("Free shipping")),
        }
    }
}

/// Pick the tier with the largest quantity threshold the line reaches.
///
/// Among tiers with equal thresholds, the first declared wins.
pub fn select_tier(tiers: &[Tier], quantity: u32) -> Option<&Tier> {
    tiers
        .iter()
        .filter(|tier| tier.quantity <= quantity)
        .fold(None, |best: Option<&Tier>, tier| match best {
            Some(current) if current.quantity >= tier.quantity => Some(current),
            _ => Some(tier),
        })
}

fn tier_outcome(
    tier: &Tier,
    line: &CartLine<'_>,
    currency: &Currency,
) -> Result<ActionOutcome, ExecutionError> {
    let (discount, unit) = match tier.kind {
        TierKind::Percent => {
            let percent = percentage_from_points(tier.value);

            let Some(discount) = percent_to_minor(&percent, line_total_minor(line)?) else {
                return Ok(ActionOutcome::none());
            };

            (discount, "%")
        }
        TierKind::Fixed => {
            let Some(amount) = amount_to_minor(tier.value, currency) else {
                return Ok(ActionOutcome::none());
            };

            (amount, amount_suffix(currency))
        }
    };

    Ok(ActionOutcome::discount(discount).with_description(format!(
        "{} {}+ units, {}{unit} off",
        line.product.name,
        tier.quantity,
        tier.value.normalize(),
    )))
}

/// Won amounts read as `원`; other currencies use their symbol.
fn amount_suffix(currency: &Currency) -> &'static str {
    if currency.iso_alpha_code == "KRW" {
        "원"
    } else {
        currency.symbol
    }
}

fn parse_value(value: &RuleValue, field: &'static str) -> Option<Decimal> {
    let parsed = value.decimal();

    if parsed.is_none() {
        warn!(field, value = %value, "ignoring action with malformed value");
    }

    parsed
}

fn percent_to_minor(percent: &Percentage, minor: i64) -> Option<i64> {
    percent_of_minor(percent, minor)
        .inspect_err(|err| warn!(%err, "ignoring action with unrepresentable percent"))
        .ok()
}

fn amount_to_minor(amount: Decimal, currency: &Currency) -> Option<i64> {
    major_to_minor(amount, currency)
        .inspect_err(|err| warn!(%err, "ignoring action with unrepresentable amount"))
        .ok()
}
