//! Promotion Fixtures

use serde::Deserialize;
use smallvec::SmallVec;

use crate::{
    conditions::{Condition, ConditionGroup, ConditionTarget, Operator},
    fixtures::FixtureError,
    promotions::{
        BoolOp, DEFAULT_PRIORITY, Promotion,
        actions::{Action, Tier, TierKind},
    },
    values::RuleValue,
};

/// Wrapper for promotions in YAML
///
/// Promotions are a sequence, not a map: their order is the insertion order that breaks
/// priority ties.
#[derive(Debug, Deserialize)]
pub struct PromotionsFixture {
    /// Promotions in insertion order
    pub promotions: Vec<PromotionFixture>,
}

/// Promotion fixture from YAML
#[derive(Debug, Deserialize)]
pub struct PromotionFixture {
    /// Unique promotion id
    pub id: String,

    /// Display name
    pub name: String,

    /// How condition groups are combined
    #[serde(default)]
    pub group_operator: BoolOp,

    /// Whether the promotion stacks with others
    #[serde(default = "default_stackable")]
    pub stackable: bool,

    /// Lower values are applied first
    #[serde(default = "default_priority")]
    pub priority: i32,

    /// Condition groups
    #[serde(default)]
    pub condition_groups: Vec<ConditionGroupFixture>,

    /// Actions, in order
    #[serde(default)]
    pub actions: Vec<ActionFixture>,
}

/// Condition group fixture
#[derive(Debug, Deserialize)]
pub struct ConditionGroupFixture {
    /// Conditions, AND-ed together
    pub conditions: Vec<ConditionFixture>,
}

/// Condition fixture
#[derive(Debug, Deserialize)]
pub struct ConditionFixture {
    /// What is inspected (cart, user or product)
    pub target: ConditionTarget,

    /// Attribute name
    pub attribute: String,

    /// Comparison operator (gte, lte, eq or `in_category`)
    pub operator: Operator,

    /// Comparison value
    pub value: ValueFixture,

    /// Product referenced by `product_quantity` conditions
    #[serde(default)]
    pub product_id: Option<String>,
}

/// A scalar rule value as written in YAML.
///
/// Numbers and booleans are kept as their text so they parse the same way authored strings do.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ValueFixture {
    /// `true` / `false`
    Boolean(bool),

    /// Whole number
    Integer(i64),

    /// Unquoted decimal
    Float(f64),

    /// Anything else, including decimals written as strings
    Text(String),
}

impl From<ValueFixture> for RuleValue {
    fn from(value: ValueFixture) -> Self {
        match value {
            ValueFixture::Boolean(flag) => RuleValue::new(flag.to_string()),
            ValueFixture::Integer(number) => RuleValue::from(number),
            ValueFixture::Float(number) => RuleValue::new(number.to_string()),
            ValueFixture::Text(text) => RuleValue::from(text),
        }
    }
}

/// Action fixture
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionFixture {
    /// Percent off the running total
    CartPercentDiscount {
        /// Percent points
        percent: ValueFixture,
    },

    /// Flat amount off the running total
    CartFixedDiscount {
        /// Major-unit amount
        amount: ValueFixture,
    },

    /// Flat amount off on behalf of a product
    ProductFixedDiscount {
        /// Major-unit amount
        amount: ValueFixture,

        /// Product the discount was authored for
        #[serde(default)]
        product_id: Option<String>,
    },

    /// Quantity-tiered discount on one product's line
    TieredDiscount {
        /// Product whose line quantity selects the tier
        target_product_id: String,

        /// Quantity tiers
        tiers: Vec<TierFixture>,
    },

    /// Gift product
    AddFreeProduct {
        /// Gift product id
        product_id: String,
    },

    /// Free shipping
    FreeShipping,
}

/// Tier fixture
#[derive(Debug, Deserialize)]
pub struct TierFixture {
    /// Minimum units of the target product
    pub quantity: u32,

    /// `percent` or `fixed`
    pub kind: TierKind,

    /// Percent points or major-unit amount
    pub value: ValueFixture,
}

fn default_stackable() -> bool {
    true
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

impl TryFrom<TierFixture> for Tier {
    type Error = FixtureError;

    fn try_from(fixture: TierFixture) -> Result<Self, Self::Error> {
        let raw = RuleValue::from(fixture.value);

        let value = raw
            .decimal()
            .ok_or_else(|| FixtureError::InvalidPromotionData(format!("invalid tier value: {raw}")))?;

        Ok(Tier {
            quantity: fixture.quantity,
            kind: fixture.kind,
            value,
        })
    }
}

impl TryFrom<ActionFixture> for Action {
    type Error = FixtureError;

    fn try_from(fixture: ActionFixture) -> Result<Self, Self::Error> {
        Ok(match fixture {
            ActionFixture::CartPercentDiscount { percent } => Action::CartPercentDiscount {
                percent: percent.into(),
            },
            ActionFixture::CartFixedDiscount { amount } => Action::CartFixedDiscount {
                amount: amount.into(),
            },
            ActionFixture::ProductFixedDiscount { amount, product_id } => {
                Action::ProductFixedDiscount {
                    amount: amount.into(),
                    product_id,
                }
            }
            ActionFixture::TieredDiscount {
                target_product_id,
                tiers,
            } => Action::TieredDiscount {
                target_product_id,
                tiers: tiers
                    .into_iter()
                    .map(Tier::try_from)
                    .collect::<Result<SmallVec<[Tier; 3]>, _>>()?,
            },
            ActionFixture::AddFreeProduct { product_id } => Action::AddFreeProduct { product_id },
            ActionFixture::FreeShipping => Action::FreeShipping,
        })
    }
}

impl From<ConditionFixture> for Condition {
    fn from(fixture: ConditionFixture) -> Self {
        Condition {
            target: fixture.target,
            attribute: fixture.attribute,
            operator: fixture.operator,
            value: fixture.value.into(),
            product_id: fixture.product_id,
        }
    }
}

impl TryFrom<PromotionFixture> for Promotion {
    type Error = FixtureError;

    fn try_from(fixture: PromotionFixture) -> Result<Self, Self::Error> {
        let mut builder = Promotion::builder(fixture.id, fixture.name)
            .group_operator(fixture.group_operator)
            .stackable(fixture.stackable)
            .priority(fixture.priority);

        for group in fixture.condition_groups {
            builder = builder.condition_group(ConditionGroup::new(
                group.conditions.into_iter().map(Condition::from),
            ));
        }

        for action in fixture.actions {
            builder = builder.action(Action::try_from(action)?);
        }

        Ok(builder.build())
    }
}
