//! Promotion Templates
//!
//! Ready-made starting points for the common promotion shapes. Each returns a
//! [`PromotionBuilder`] so priority and stackability can still be adjusted.

use rust_decimal::Decimal;
use smallvec::SmallVec;

use crate::{
    conditions::{Condition, ConditionGroup},
    discounts::minor_to_major,
    products::Product,
    promotions::{
        Promotion, PromotionBuilder,
        actions::{Action, Tier},
    },
    values::RuleValue,
};

/// Flat amount off the cart once the subtotal reaches `min_subtotal`.
pub fn amount_discount(
    id: impl Into<String>,
    min_subtotal: impl Into<RuleValue>,
    amount: impl Into<RuleValue>,
) -> PromotionBuilder {
    Promotion::builder(id, "Amount discount")
        .condition_group(ConditionGroup::new([Condition::subtotal_at_least(min_subtotal)]))
        .action(Action::CartFixedDiscount {
            amount: amount.into(),
        })
}

/// Percentage off the cart once the subtotal reaches `min_subtotal`.
pub fn percent_discount(
    id: impl Into<String>,
    min_subtotal: impl Into<RuleValue>,
    percent: impl Into<RuleValue>,
) -> PromotionBuilder {
    Promotion::builder(id, "Percent discount")
        .condition_group(ConditionGroup::new([Condition::subtotal_at_least(min_subtotal)]))
        .action(Action::CartPercentDiscount {
            percent: percent.into(),
        })
}

/// Buy one, get one: with two or more of `product` in the cart, one unit's price comes off.
pub fn bogo(id: impl Into<String>, product: &Product<'_>) -> PromotionBuilder {
    let unit_price = minor_to_major(product.price.to_minor_units(), product.price.currency());

    Promotion::builder(id, "BOGO")
        .condition_group(ConditionGroup::new([Condition::product_quantity_at_least(
            product.id.clone(),
            2_i64,
        )]))
        .action(Action::ProductFixedDiscount {
            amount: unit_price.into(),
            product_id: Some(product.id.clone()),
        })
}

/// Free shipping once the subtotal reaches `min_subtotal`.
pub fn free_shipping(
    id: impl Into<String>,
    min_subtotal: impl Into<RuleValue>,
) -> PromotionBuilder {
    Promotion::builder(id, "Free shipping")
        .condition_group(ConditionGroup::new([Condition::subtotal_at_least(min_subtotal)]))
        .action(Action::FreeShipping)
}

/// A gift product once the subtotal reaches `min_subtotal`.
pub fn gift_with_purchase(
    id: impl Into<String>,
    min_subtotal: impl Into<RuleValue>,
    gift_product_id: impl Into<String>,
) -> PromotionBuilder {
    Promotion::builder(id, "Gift with purchase")
        .condition_group(ConditionGroup::new([Condition::subtotal_at_least(min_subtotal)]))
        .action(Action::AddFreeProduct {
            product_id: gift_product_id.into(),
        })
}

/// Buy more, save more on a single product. Unconditional; the tiers do the gating.
pub fn tiered(
    id: impl Into<String>,
    target_product_id: impl Into<String>,
    tiers: impl IntoIterator<Item = Tier>,
) -> PromotionBuilder {
    Promotion::builder(id, "Buy more, save more").action(Action::TieredDiscount {
        target_product_id: target_product_id.into(),
        tiers: tiers.into_iter().collect::<SmallVec<[Tier; 3]>>(),
    })
}

/// The default first tier offered when authoring a tiered promotion: 10% off from two units.
pub fn default_tier() -> Tier {
    Tier::percent(2, Decimal::TEN)
}
