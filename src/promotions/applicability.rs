//! Promotion Applicability
//!
//! Decides which promotions apply to a cart and in what order they run. This knows nothing
//! about actions or stacking.

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::{conditions::CartSnapshot, promotions::Promotion, users::UserProfile};

/// Promotions selected for a cart, in application order.
pub type ApplicablePromotions<'p> = SmallVec<[&'p Promotion; 8]>;

/// Keep the promotions whose conditions hold and order them by ascending priority.
///
/// Promotions with equal priority keep the order they have in `promotions`.
pub fn select_applicable<'p>(
    promotions: &'p [Promotion],
    cart: &CartSnapshot<'_, '_>,
    user: &UserProfile,
) -> ApplicablePromotions<'p> {
    let mut applicable: SmallVec<[(usize, &'p Promotion); 8]> = promotions
        .iter()
        .enumerate()
        .filter(|(_, promotion)| {
            let applicable = promotion.is_applicable(cart, user);

            trace!(promotion_id = %promotion.id, applicable, "checked promotion conditions");

            applicable
        })
        .collect();

    // Insertion index breaks priority ties explicitly.
    applicable.sort_unstable_by_key(|(index, promotion)| (promotion.priority, *index));

    let ordered: ApplicablePromotions<'p> = applicable
        .into_iter()
        .map(|(_, promotion)| promotion)
        .collect();

    debug!(
        candidates = promotions.len(),
        selected = ?ordered.iter().map(|p| p.id.as_str()).collect::<SmallVec<[&str; 8]>>(),
        "selected applicable promotions"
    );

    ordered
}
