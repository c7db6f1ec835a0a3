//! Promotion Conditions
//!
//! Atomic predicates over a cart and user, and the AND-groups they are combined into.
//!
//! Evaluation is fail-closed: any target/attribute/operator combination that is not
//! recognised, any malformed value and any reference to a product that is not in the cart
//! evaluates to `false`.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use smallvec::SmallVec;
use tracing::trace;

use crate::{
    cart::{Cart, CartLine},
    discounts::minor_to_major,
    pricing::TotalPriceError,
    users::UserProfile,
    values::RuleValue,
};

/// What a condition inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionTarget {
    /// The cart as a whole
    Cart,

    /// The shopper's profile
    User,

    /// The products in the cart
    Product,
}

/// How a condition compares the inspected attribute with its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Greater than or equal
    Gte,

    /// Less than or equal
    Lte,

    /// Equal
    Eq,

    /// Any cart line's product is in the named category
    InCategory,
}

/// An immutable view of a cart with its subtotal computed once.
#[derive(Debug, Clone, Copy)]
pub struct CartSnapshot<'s, 'a> {
    lines: &'s [CartLine<'a>],
    subtotal: Money<'a, Currency>,
}

impl<'s, 'a> CartSnapshot<'s, 'a> {
    /// Snapshot a cart.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalPriceError`] if the subtotal cannot be calculated.
    pub fn new(cart: &'s Cart<'a>) -> Result<Self, TotalPriceError> {
        Ok(Self {
            lines: cart.lines(),
            subtotal: cart.subtotal()?,
        })
    }

    /// The cart lines.
    pub fn lines(&self) -> &'s [CartLine<'a>] {
        self.lines
    }

    /// The cart subtotal (before any promotion).
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// The subtotal as a major-unit decimal.
    pub fn subtotal_major(&self) -> Decimal {
        minor_to_major(self.subtotal.to_minor_units(), self.subtotal.currency())
    }

    /// Sum of all line quantities.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Find the line for a product.
    pub fn line(&self, product_id: &str) -> Option<&'s CartLine<'a>> {
        self.lines.iter().find(|line| line.product_id() == product_id)
    }
}

/// A single atomic predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// What is inspected
    pub target: ConditionTarget,

    /// Attribute name (e.g. `subtotal`, `membershipTier`, `category`)
    pub attribute: String,

    /// Comparison operator
    pub operator: Operator,

    /// Raw comparison value
    pub value: RuleValue,

    /// Product referenced by `product_quantity` conditions
    pub product_id: Option<String>,
}

impl Condition {
    /// Create a condition that does not reference a specific product.
    pub fn new(
        target: ConditionTarget,
        attribute: impl Into<String>,
        operator: Operator,
        value: impl Into<RuleValue>,
    ) -> Self {
        Self {
            target,
            attribute: attribute.into(),
            operator,
            value: value.into(),
            product_id: None,
        }
    }

    /// Cart subtotal is at least `amount`.
    pub fn subtotal_at_least(amount: impl Into<RuleValue>) -> Self {
        Self::new(ConditionTarget::Cart, "subtotal", Operator::Gte, amount)
    }

    /// Cart subtotal is at most `amount`.
    pub fn subtotal_at_most(amount: impl Into<RuleValue>) -> Self {
        Self::new(ConditionTarget::Cart, "subtotal", Operator::Lte, amount)
    }

    /// Total units in the cart are at least `count`.
    pub fn item_count_at_least(count: impl Into<RuleValue>) -> Self {
        Self::new(ConditionTarget::Cart, "item_count", Operator::Gte, count)
    }

    /// The cart holds at least `quantity` units of `product_id`.
    pub fn product_quantity_at_least(
        product_id: impl Into<String>,
        quantity: impl Into<RuleValue>,
    ) -> Self {
        Self {
            product_id: Some(product_id.into()),
            ..Self::new(ConditionTarget::Cart, "product_quantity", Operator::Gte, quantity)
        }
    }

    /// The user has the given membership tier.
    pub fn membership_tier(tier: impl Into<RuleValue>) -> Self {
        Self::new(ConditionTarget::User, "membershipTier", Operator::Eq, tier)
    }

    /// The user's new-user flag equals `is_new`.
    pub fn new_user(is_new: bool) -> Self {
        Self::new(
            ConditionTarget::User,
            "isNewUser",
            Operator::Eq,
            if is_new { "true" } else { "false" },
        )
    }

    /// Some cart line's product is in `category`.
    pub fn in_category(category: impl Into<RuleValue>) -> Self {
        Self::new(ConditionTarget::Product, "category", Operator::InCategory, category)
    }

    /// Evaluate the condition against a cart snapshot and user.
    #[must_use]
    pub fn evaluate(&self, cart: &CartSnapshot<'_, '_>, user: &UserProfile) -> bool {
        let result = match (self.target, self.attribute.as_str(), self.operator) {
            (ConditionTarget::Cart, "subtotal", op @ (Operator::Gte | Operator::Lte)) => self
                .value
                .decimal()
                .is_some_and(|threshold| compare(op, cart.subtotal_major().cmp(&threshold))),
            (ConditionTarget::Cart, "item_count", Operator::Gte) => {
                self.value.integer().is_some_and(|threshold| {
                    compare(Operator::Gte, i128::from(cart.item_count()).cmp(&i128::from(threshold)))
                })
            }
            (ConditionTarget::Cart, "product_quantity", Operator::Gte) => self
                .product_id
                .as_deref()
                .and_then(|product_id| cart.line(product_id))
                .zip(self.value.integer())
                .is_some_and(|(line, threshold)| {
                    compare(Operator::Gte, i64::from(line.quantity).cmp(&threshold))
                }),
            (ConditionTarget::User, "membershipTier", Operator::Eq) => {
                user.membership_tier.as_str() == self.value.as_str()
            }
            (ConditionTarget::User, "isNewUser", Operator::Eq) => self
                .value
                .boolean()
                .is_some_and(|expected| user.is_new_user == expected),
            (ConditionTarget::User, "region", Operator::Eq) => user
                .region
                .as_deref()
                .is_some_and(|region| region == self.value.as_str()),
            (ConditionTarget::User, "age", op @ (Operator::Gte | Operator::Lte | Operator::Eq)) => {
                user.age
                    .zip(self.value.integer())
                    .is_some_and(|(age, threshold)| compare(op, i64::from(age).cmp(&threshold)))
            }
            (ConditionTarget::Product, "category", Operator::InCategory) => cart
                .lines()
                .iter()
                .any(|line| line.product.category == self.value.as_str()),
            _ => false,
        };

        trace!(
            target_kind = ?self.target,
            attribute = %self.attribute,
            operator = ?self.operator,
            value = %self.value,
            result,
            "evaluated condition"
        );

        result
    }
}

/// Apply a comparison operator to an ordering of `actual` against `expected`.
fn compare(operator: Operator, ordering: Ordering) -> bool {
    match operator {
        Operator::Gte => ordering.is_ge(),
        Operator::Lte => ordering.is_le(),
        Operator::Eq => ordering.is_eq(),
        Operator::InCategory => false,
    }
}

/// An ordered list of conditions that must all hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionGroup {
    /// Conditions, AND-ed together. Empty means "always true".
    pub conditions: SmallVec<[Condition; 2]>,
}

impl ConditionGroup {
    /// Create a group from conditions.
    #[must_use]
    pub fn new(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self {
            conditions: conditions.into_iter().collect(),
        }
    }

    /// Evaluate every condition in the group; vacuously true when empty.
    #[must_use]
    pub fn matches(&self, cart: &CartSnapshot<'_, '_>, user: &UserProfile) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.evaluate(cart, user))
    }
}
