//! Promotion Stacking
//!
//! Runs an ordered list of applicable promotions against a running total.
//!
//! The executor is a fold over [`StackingState`]: each step takes the previous state and a
//! promotion and produces the next state. Two rules govern the fold:
//!
//! - once a non-stackable promotion has been processed, later non-stackable promotions are
//!   skipped entirely, while stackable promotions keep applying;
//! - the running total may go negative while promotions run and is floored at zero exactly
//!   once, when the fold finishes.

use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    conditions::CartSnapshot,
    pricing::TotalPriceError,
    products::Catalog,
    promotions::{
        Promotion,
        actions::{ActionContext, ActionOutcome},
    },
    receipt::{AppliedPromotion, AppliedPromotions, PricedCart},
};

/// Errors raised while executing promotions.
#[derive(Debug, Error, PartialEq)]
pub enum ExecutionError {
    /// Error calculating cart or line totals.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// State threaded through the promotion fold.
#[derive(Debug, Clone, PartialEq)]
pub struct StackingState<'a> {
    running_total: i64,
    non_stackable_applied: bool,
    applied: AppliedPromotions<'a>,
    currency: &'a Currency,
}

impl<'a> StackingState<'a> {
    /// Start a fold from the cart subtotal.
    pub fn new(subtotal: Money<'a, Currency>) -> Self {
        Self {
            running_total: subtotal.to_minor_units(),
            non_stackable_applied: false,
            applied: SmallVec::new(),
            currency: subtotal.currency(),
        }
    }

    /// Running total in minor units. May be negative before [`finish`](Self::finish).
    pub fn running_total(&self) -> i64 {
        self.running_total
    }

    /// Whether a non-stackable promotion has already been processed.
    pub fn non_stackable_applied(&self) -> bool {
        self.non_stackable_applied
    }

    /// Records emitted so far.
    pub fn applied(&self) -> &[AppliedPromotion<'a>] {
        &self.applied
    }

    /// Whether `promotion` may run given the promotions processed so far.
    ///
    /// Only a second non-stackable promotion is blocked; stackable promotions always run.
    pub fn admits(&self, promotion: &Promotion) -> bool {
        promotion.stackable || !self.non_stackable_applied
    }

    /// Process one promotion, producing the next state.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecutionError`] if a line total overflows.
    pub fn step(
        mut self,
        promotion: &Promotion,
        ctx: &ActionContext<'_, '_>,
    ) -> Result<Self, ExecutionError> {
        if !self.admits(promotion) {
            debug!(
                promotion_id = %promotion.id,
                "skipping non-stackable promotion; another non-stackable promotion already applied"
            );

            return Ok(self);
        }

        let outcome = promotion.actions.iter().try_fold(
            PromotionOutcome::new(self.running_total),
            |outcome, action| {
                let effect = action.apply(ctx, outcome.running_total)?;

                Ok::<_, ExecutionError>(outcome.absorb(effect))
            },
        )?;

        if outcome.applied {
            debug!(
                promotion_id = %promotion.id,
                discount = outcome.discount,
                running_total = outcome.running_total,
                "applied promotion"
            );

            self.applied.push(AppliedPromotion {
                promotion_id: promotion.id.clone(),
                promotion_name: promotion.name.clone(),
                discount_amount: Money::from_minor(outcome.discount, self.currency),
                description: outcome.description,
            });
        }

        self.running_total = outcome.running_total;

        if !promotion.stackable {
            self.non_stackable_applied = true;
        }

        Ok(self)
    }

    /// Floor the running total at zero and hand back the final total and records.
    pub fn finish(self) -> (Money<'a, Currency>, AppliedPromotions<'a>) {
        (
            Money::from_minor(self.running_total.max(0), self.currency),
            self.applied,
        )
    }
}

/// Accumulated effect of one promotion's actions.
#[derive(Debug)]
struct PromotionOutcome {
    running_total: i64,
    discount: i64,
    applied: bool,
    description: Option<String>,
}

impl PromotionOutcome {
    fn new(running_total: i64) -> Self {
        Self {
            running_total,
            discount: 0,
            applied: false,
            description: None,
        }
    }

    /// Fold an action's effect in. An action whose discount overflows the totals is ignored.
    fn absorb(self, action: ActionOutcome) -> Self {
        let (Some(running_total), Some(discount)) = (
            self.running_total.checked_sub(action.discount),
            self.discount.checked_add(action.discount),
        ) else {
            warn!(
                discount = action.discount,
                running_total = self.running_total,
                "ignoring action whose discount overflows the running total"
            );

            return self;
        };

        Self {
            running_total,
            discount,
            applied: self.applied || action.applied,
            description: action.description.or(self.description),
        }
    }
}

/// Run promotions, already filtered and ordered, against a cart.
///
/// # Errors
///
/// Returns an [`ExecutionError`] if a line total overflows.
pub fn execute<'a>(
    ordered: &[&Promotion],
    cart: &CartSnapshot<'_, 'a>,
    catalog: &Catalog<'a>,
) -> Result<PricedCart<'a>, ExecutionError> {
    let subtotal = cart.subtotal();
    let ctx = ActionContext {
        cart,
        catalog,
        currency: subtotal.currency(),
    };

    let state = ordered
        .iter()
        .try_fold(StackingState::new(subtotal), |state, promotion| {
            state.step(promotion, &ctx)
        })?;

    let (final_total, applied) = state.finish();

    Ok(PricedCart::new(
        cart.lines().to_vec(),
        subtotal,
        applied,
        final_total,
    ))
}
