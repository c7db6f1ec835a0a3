//! Rulecart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine},
    conditions::{CartSnapshot, Condition, ConditionGroup, ConditionTarget, Operator},
    discounts::DiscountError,
    engine::{EngineError, PromotionEngine, apply_promotions},
    pricing::TotalPriceError,
    products::{Catalog, CatalogError, Product, ProductKey},
    promotions::{
        BoolOp, DEFAULT_PRIORITY, Promotion, PromotionBuilder,
        actions::{Action, Tier, TierKind},
        applicability::select_applicable,
        registry::{PromotionRegistry, RegistryError},
        templates,
    },
    receipt::{AppliedPromotion, PricedCart, ReceiptError},
    stacking::{ExecutionError, StackingState},
    tags::StringTagCollection,
    users::{MembershipTier, UserProfile},
    values::RuleValue,
};
