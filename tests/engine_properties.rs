//! Integration tests for promotion ordering, stacking and pricing behaviour.
//!
//! Every test prices a KRW cart through `apply_promotions`, the same entry point the
//! `PromotionEngine` uses after each mutation.

use rusty_money::{Money, iso::KRW};
use smallvec::smallvec;
use testresult::TestResult;

use rulecart::prelude::*;

fn product(id: &str, name: &str, price: i64, category: &str) -> Product<'static> {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price: Money::from_minor(price, KRW),
        category: category.to_string(),
        tags: StringTagCollection::empty(),
    }
}

fn catalog() -> Result<Catalog<'static>, CatalogError> {
    Catalog::with_products(
        [
            product("prod_110", "Cicapair Cream", 10_000, "skincare"),
            product("prod_101", "Birch Sunscreen", 25_000, "skincare"),
            product("prod_125", "Kill Cover Cushion", 32_000, "makeup"),
            product("prod_140", "Travel Pouch", 5_000, "accessories"),
        ],
        KRW,
    )
}

fn cart_of(catalog: &Catalog<'static>, lines: &[(&str, u32)]) -> TestResult<Cart<'static>> {
    let lines = lines
        .iter()
        .map(|&(id, quantity)| {
            catalog
                .get(id)
                .cloned()
                .map(|product| CartLine::new(product, quantity))
                .ok_or(format!("unknown product {id}"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Cart::with_lines(lines, KRW)?)
}

fn user(tier: MembershipTier) -> UserProfile {
    UserProfile::new("user_123", "Hyein", tier, false)
}

fn ids<'p>(priced: &'p PricedCart<'_>) -> Vec<&'p str> {
    priced
        .applied_promotions()
        .iter()
        .map(|applied| applied.promotion_id.as_str())
        .collect()
}

fn percent(id: &str, points: &str, priority: i32) -> Promotion {
    Promotion::builder(id, id)
        .priority(priority)
        .action(Action::CartPercentDiscount {
            percent: points.into(),
        })
        .build()
}

fn fixed(id: &str, amount: &str, priority: i32, stackable: bool) -> Promotion {
    Promotion::builder(id, id)
        .priority(priority)
        .stackable(stackable)
        .action(Action::CartFixedDiscount {
            amount: amount.into(),
        })
        .build()
}

#[test]
fn fixed_discount_over_threshold() -> TestResult {
    let catalog = catalog()?;
    let cart = cart_of(&catalog, &[("prod_110", 2)])?;

    let promotion = Promotion::builder("promo_5000", "5000 off over 15000")
        .condition_group(ConditionGroup::new([Condition::subtotal_at_least("15000")]))
        .action(Action::CartFixedDiscount {
            amount: "5000".into(),
        })
        .build();

    let priced = apply_promotions(&cart, &user(MembershipTier::Silver), &[promotion], &catalog)?;

    assert_eq!(priced.subtotal(), Money::from_minor(20_000, KRW));
    assert_eq!(priced.final_total(), Money::from_minor(15_000, KRW));
    assert_eq!(
        priced.applied_promotions(),
        [AppliedPromotion {
            promotion_id: "promo_5000".to_string(),
            promotion_name: "5000 off over 15000".to_string(),
            discount_amount: Money::from_minor(5_000, KRW),
            description: None,
        }]
    );

    Ok(())
}

#[test]
fn percent_discount_uses_running_total() -> TestResult {
    let catalog = catalog()?;
    let cart = cart_of(&catalog, &[("prod_110", 2)])?;

    let promotions = [percent("ten_percent", "10", 1), fixed("thousand", "1000", 2, true)];

    let priced = apply_promotions(&cart, &user(MembershipTier::Silver), &promotions, &catalog)?;

    let discounts: Vec<i64> = priced
        .applied_promotions()
        .iter()
        .map(|applied| applied.discount_amount.to_minor_units())
        .collect();

    assert_eq!(discounts, [2_000, 1_000]);
    assert_eq!(priced.final_total(), Money::from_minor(17_000, KRW));

    Ok(())
}

#[test]
fn applied_order_follows_ascending_priority() -> TestResult {
    let catalog = catalog()?;
    let cart = cart_of(&catalog, &[("prod_101", 4)])?;

    let promotions = [
        percent("p30", "5", 30),
        percent("p10", "5", 10),
        percent("p20", "5", 20),
    ];

    let priced = apply_promotions(&cart, &user(MembershipTier::Silver), &promotions, &catalog)?;

    assert_eq!(ids(&priced), ["p10", "p20", "p30"]);

    Ok(())
}

#[test]
fn second_non_stackable_promotion_is_blocked() -> TestResult {
    let catalog = catalog()?;
    let cart = cart_of(&catalog, &[("prod_101", 1)])?;

    let both_exclusive = [fixed("a", "1000", 1, false), fixed("b", "1000", 2, false)];
    let priced = apply_promotions(&cart, &user(MembershipTier::Silver), &both_exclusive, &catalog)?;

    assert_eq!(ids(&priced), ["a"]);

    let then_stackable = [fixed("a", "1000", 1, false), fixed("b", "1000", 2, true)];
    let priced = apply_promotions(&cart, &user(MembershipTier::Silver), &then_stackable, &catalog)?;

    assert_eq!(ids(&priced), ["a", "b"]);

    Ok(())
}

#[test]
fn stackable_before_non_stackable_does_not_block_it() -> TestResult {
    let catalog = catalog()?;
    let cart = cart_of(&catalog, &[("prod_101", 1)])?;

    let promotions = [
        fixed("stackable", "1000", 1, true),
        fixed("exclusive", "1000", 2, false),
        fixed("late_exclusive", "1000", 3, false),
        fixed("late_stackable", "1000", 4, true),
    ];

    let priced = apply_promotions(&cart, &user(MembershipTier::Silver), &promotions, &catalog)?;

    assert_eq!(ids(&priced), ["stackable", "exclusive", "late_stackable"]);
    assert_eq!(priced.final_total(), Money::from_minor(22_000, KRW));

    Ok(())
}

#[test]
fn tier_with_highest_reached_threshold_wins() -> TestResult {
    let catalog = catalog()?;
    let cart = cart_of(&catalog, &[("prod_101", 5)])?;

    let promotion = templates::tiered(
        "promo_tiered",
        "prod_101",
        [Tier::percent(2, 10), Tier::percent(5, 20)],
    )
    .build();

    let priced = apply_promotions(&cart, &user(MembershipTier::Silver), &[promotion], &catalog)?;
    let applied = priced.applied_promotions().first().ok_or("no promotion applied")?;

    // 20% of 5 × 25,000
    assert_eq!(applied.discount_amount, Money::from_minor(25_000, KRW));
    assert_eq!(
        applied.description.as_deref(),
        Some("Birch Sunscreen 5+ units, 20% off")
    );

    Ok(())
}

#[test]
fn condition_groups_combine_with_and_or_or() -> TestResult {
    let catalog = catalog()?;
    let small_cart = cart_of(&catalog, &[("prod_110", 1)])?;
    let big_cart = cart_of(&catalog, &[("prod_101", 2)])?;

    let groups = |op: BoolOp| {
        Promotion::builder("promo", "Big spender or VIP")
            .group_operator(op)
            .condition_group(ConditionGroup::new([Condition::subtotal_at_least("50000")]))
            .condition_group(ConditionGroup::new([Condition::membership_tier("vip")]))
            .action(Action::FreeShipping)
            .build()
    };

    let applies = |cart: &Cart<'static>, tier: MembershipTier, op: BoolOp| -> TestResult<bool> {
        let priced = apply_promotions(cart, &user(tier), &[groups(op)], &catalog)?;

        Ok(!priced.applied_promotions().is_empty())
    };

    assert!(applies(&big_cart, MembershipTier::Silver, BoolOp::Or)?);
    assert!(applies(&small_cart, MembershipTier::Vip, BoolOp::Or)?);
    assert!(!applies(&small_cart, MembershipTier::Silver, BoolOp::Or)?);

    assert!(applies(&big_cart, MembershipTier::Vip, BoolOp::And)?);
    assert!(!applies(&big_cart, MembershipTier::Silver, BoolOp::And)?);
    assert!(!applies(&small_cart, MembershipTier::Vip, BoolOp::And)?);

    Ok(())
}

#[test]
fn final_total_never_goes_negative() -> TestResult {
    let catalog = catalog()?;
    let cart = cart_of(&catalog, &[("prod_110", 1)])?;

    let promotions = [
        fixed("huge", "50000", 1, true),
        percent("percent", "50", 2),
        fixed("more", "1000", 3, true),
    ];

    let priced = apply_promotions(&cart, &user(MembershipTier::Silver), &promotions, &catalog)?;

    assert_eq!(priced.final_total(), Money::from_minor(0, KRW));
    assert_eq!(priced.savings()?, priced.subtotal());

    Ok(())
}

#[test]
fn non_negative_discounts_keep_final_total_within_subtotal() -> TestResult {
    let catalog = catalog()?;
    let cart = cart_of(&catalog, &[("prod_110", 3), ("prod_125", 1), ("prod_101", 2)])?;

    let promotions = [
        percent("p1", "15", 5),
        fixed("f1", "3000", 1, false),
        fixed("f2", "12345", 3, true),
        templates::tiered("t1", "prod_110", [Tier::fixed(3, 2_500)]).priority(2).build(),
        templates::free_shipping("ship", "0").build(),
    ];

    let priced = apply_promotions(&cart, &user(MembershipTier::Gold), &promotions, &catalog)?;

    assert!(priced.final_total().to_minor_units() >= 0);
    assert!(priced.final_total().to_minor_units() <= priced.subtotal().to_minor_units());

    Ok(())
}

#[test]
fn malformed_and_dangling_rules_degrade_to_no_ops() -> TestResult {
    let catalog = catalog()?;
    let cart = cart_of(&catalog, &[("prod_110", 2)])?;

    let promotions = [
        Promotion::builder("bad_condition", "Unknown attribute")
            .condition_group(ConditionGroup::new([Condition::new(
                ConditionTarget::Cart,
                "weight",
                Operator::Gte,
                "1",
            )]))
            .action(Action::FreeShipping)
            .build(),
        Promotion::builder("bad_value", "Malformed amount")
            .action(Action::CartFixedDiscount {
                amount: "five thousand".into(),
            })
            .build(),
        Promotion::builder("missing_gift", "Gift not in catalog")
            .action(Action::AddFreeProduct {
                product_id: "prod_404".to_string(),
            })
            .build(),
        fixed("good", "1000", 200, true),
    ];

    let priced = apply_promotions(&cart, &user(MembershipTier::Silver), &promotions, &catalog)?;

    assert_eq!(ids(&priced), ["good"]);
    assert_eq!(priced.final_total(), Money::from_minor(19_000, KRW));

    Ok(())
}

#[test]
fn unrepresentable_percent_does_not_abort_evaluation() -> TestResult {
    let catalog = catalog()?;
    let cart = cart_of(&catalog, &[("prod_110", 2)])?;

    let promotions = [
        percent("huge", "99999999999999999999999999", 1),
        fixed("thousand", "1000", 2, true),
    ];

    let priced = apply_promotions(&cart, &user(MembershipTier::Silver), &promotions, &catalog)?;

    assert_eq!(ids(&priced), ["thousand"]);
    assert_eq!(priced.final_total(), Money::from_minor(19_000, KRW));

    Ok(())
}

#[test]
fn gifts_and_shipping_are_recorded_without_discount() -> TestResult {
    let catalog = catalog()?;
    let cart = cart_of(&catalog, &[("prod_125", 2)])?;

    let promotions = [
        templates::gift_with_purchase("gift", "50000", "prod_140").build(),
        templates::free_shipping("ship", "30000").build(),
    ];

    let priced = apply_promotions(&cart, &user(MembershipTier::Silver), &promotions, &catalog)?;

    let records: Vec<(&str, i64, Option<&str>)> = priced
        .applied_promotions()
        .iter()
        .map(|applied| {
            (
                applied.promotion_id.as_str(),
                applied.discount_amount.to_minor_units(),
                applied.description.as_deref(),
            )
        })
        .collect();

    assert_eq!(
        records,
        [
            ("gift", 0, Some("Gift: Travel Pouch")),
            ("ship", 0, Some("Free shipping")),
        ]
    );
    assert_eq!(priced.final_total(), priced.subtotal());

    Ok(())
}

#[test]
fn bogo_template_takes_one_unit_off() -> TestResult {
    let catalog = catalog()?;
    let sunscreen = catalog.get("prod_101").cloned().ok_or("missing product")?;

    let promotion = templates::bogo("bogo", &sunscreen).build();

    let one = cart_of(&catalog, &[("prod_101", 1)])?;
    let two = cart_of(&catalog, &[("prod_101", 2)])?;

    let priced_one = apply_promotions(&one, &user(MembershipTier::Silver), &[promotion.clone()], &catalog)?;
    let priced_two = apply_promotions(&two, &user(MembershipTier::Silver), &[promotion], &catalog)?;

    assert!(priced_one.applied_promotions().is_empty());
    assert_eq!(priced_two.final_total(), Money::from_minor(25_000, KRW));

    Ok(())
}

#[test]
fn evaluation_is_idempotent() -> TestResult {
    let catalog = catalog()?;
    let cart = cart_of(&catalog, &[("prod_110", 3), ("prod_125", 1)])?;

    let promotions = [
        percent("p1", "7.5", 2),
        fixed("f1", "999", 1, false),
        Promotion::builder("tiers", "Cream tiers")
            .action(Action::TieredDiscount {
                target_product_id: "prod_110".to_string(),
                tiers: smallvec![Tier::percent(2, 5), Tier::fixed(3, 1_500)],
            })
            .build(),
    ];

    let member = user(MembershipTier::Gold);

    let first = apply_promotions(&cart, &member, &promotions, &catalog)?;
    let second = apply_promotions(&cart, &member, &promotions, &catalog)?;

    assert_eq!(first, second);

    Ok(())
}
