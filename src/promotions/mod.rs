//! Promotions
//!
//! A promotion is a set of condition groups (combined with [`BoolOp`]) guarding a list of
//! [`Action`]s, plus the priority and stackability that decide how it interacts with other
//! promotions.

use serde::Deserialize;
use smallvec::SmallVec;

use crate::{
    conditions::{CartSnapshot, ConditionGroup},
    promotions::actions::Action,
    users::UserProfile,
};

pub mod actions;
pub mod applicability;
pub mod registry;
pub mod templates;

/// Priority given to promotions that do not set one.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Boolean operation used to combine condition groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoolOp {
    /// All groups must match.
    #[default]
    And,

    /// At least one group must match.
    Or,
}

/// Promotion
///
/// Immutable once built; edits happen by replacing the whole promotion in a
/// [`PromotionRegistry`](registry::PromotionRegistry).
#[derive(Debug, Clone, PartialEq)]
pub struct Promotion {
    /// Unique promotion id
    pub id: String,

    /// Display name
    pub name: String,

    /// How condition groups are combined
    pub group_operator: BoolOp,

    /// Condition groups. Empty means "always applicable".
    pub condition_groups: SmallVec<[ConditionGroup; 2]>,

    /// Actions, run in declared order
    pub actions: SmallVec<[Action; 2]>,

    /// Whether this promotion may apply alongside another non-stackable promotion
    pub stackable: bool,

    /// Lower values are applied first
    pub priority: i32,
}

impl Promotion {
    /// Start building a promotion with the default authoring settings: AND-combined groups,
    /// no conditions, no actions, stackable, priority [`DEFAULT_PRIORITY`].
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> PromotionBuilder {
        PromotionBuilder {
            promotion: Promotion {
                id: id.into(),
                name: name.into(),
                group_operator: BoolOp::And,
                condition_groups: SmallVec::new(),
                actions: SmallVec::new(),
                stackable: true,
                priority: DEFAULT_PRIORITY,
            },
        }
    }

    /// Return whether this promotion's conditions hold for the given cart and user.
    #[must_use]
    pub fn is_applicable(&self, cart: &CartSnapshot<'_, '_>, user: &UserProfile) -> bool {
        if self.condition_groups.is_empty() {
            return true;
        }

        let mut groups = self
            .condition_groups
            .iter()
            .map(|group| group.matches(cart, user));

        match self.group_operator {
            BoolOp::And => groups.all(|matched| matched),
            BoolOp::Or => groups.any(|matched| matched),
        }
    }
}

/// Builder for [`Promotion`].
#[derive(Debug, Clone)]
pub struct PromotionBuilder {
    promotion: Promotion,
}

impl PromotionBuilder {
    /// Set how condition groups are combined.
    #[must_use]
    pub fn group_operator(mut self, op: BoolOp) -> Self {
        self.promotion.group_operator = op;
        self
    }

    /// Append a condition group.
    #[must_use]
    pub fn condition_group(mut self, group: ConditionGroup) -> Self {
        self.promotion.condition_groups.push(group);
        self
    }

    /// Append an action.
    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.promotion.actions.push(action);
        self
    }

    /// Set whether the promotion is stackable.
    #[must_use]
    pub fn stackable(mut self, stackable: bool) -> Self {
        self.promotion.stackable = stackable;
        self
    }

    /// Set the priority.
    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.promotion.priority = priority;
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Promotion {
        self.promotion
    }
}
