//! Receipt

use std::{fmt::Write, io};

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::cart::CartLine;

/// Errors that can occur when rendering a priced cart.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// A promotion that took effect on a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPromotion<'a> {
    /// Promotion id
    pub promotion_id: String,

    /// Promotion display name
    pub promotion_name: String,

    /// Total taken off by this promotion's actions. Zero for gifts and free shipping.
    pub discount_amount: Money<'a, Currency>,

    /// Detail from the promotion's last describing action, if any
    pub description: Option<String>,
}

/// Applied promotion records, in application order.
pub type AppliedPromotions<'a> = SmallVec<[AppliedPromotion<'a>; 4]>;

/// The outcome of pricing a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedCart<'a> {
    /// The cart lines, unchanged
    items: Vec<CartLine<'a>>,

    /// Total cost before any promotion
    subtotal: Money<'a, Currency>,

    /// Promotions that took effect, in application order
    applied_promotions: AppliedPromotions<'a>,

    /// Amount to pay, never negative
    final_total: Money<'a, Currency>,

    /// Currency used for all monetary values
    currency: &'a Currency,
}

impl<'a> PricedCart<'a> {
    /// Create a priced cart. The currency is taken from `subtotal`.
    #[must_use]
    pub fn new(
        items: Vec<CartLine<'a>>,
        subtotal: Money<'a, Currency>,
        applied_promotions: AppliedPromotions<'a>,
        final_total: Money<'a, Currency>,
    ) -> Self {
        Self {
            items,
            subtotal,
            applied_promotions,
            final_total,
            currency: subtotal.currency(),
        }
    }

    /// A priced cart with no promotions applied.
    #[must_use]
    pub fn undiscounted(items: Vec<CartLine<'a>>, subtotal: Money<'a, Currency>) -> Self {
        Self::new(items, subtotal, SmallVec::new(), subtotal)
    }

    /// The cart lines.
    #[must_use]
    pub fn items(&self) -> &[CartLine<'a>] {
        &self.items
    }

    /// Total cost before any promotion
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Promotions that took effect, in application order.
    #[must_use]
    pub fn applied_promotions(&self) -> &[AppliedPromotion<'a>] {
        &self.applied_promotions
    }

    /// Amount to pay
    #[must_use]
    pub fn final_total(&self) -> Money<'a, Currency> {
        self.final_total
    }

    /// Currency used for all monetary values.
    #[must_use]
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Calculate the savings made by applying promotions.
    ///
    /// This is the difference the shopper actually sees, so it never exceeds the subtotal
    /// even when the recorded discounts add up to more.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.subtotal.sub(self.final_total)
    }

    /// Calculates the savings made by applying the promotions as a percentage
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings_percent(&self) -> Result<Percentage, MoneyError> {
        let savings_minor = self.savings()?.to_minor_units();
        let subtotal_minor = self.subtotal.to_minor_units();

        if subtotal_minor == 0 {
            return Ok(Percentage::from(0.0));
        }

        let savings_dec = Decimal::from_i64(savings_minor).unwrap_or(Decimal::ZERO);
        let subtotal_dec = Decimal::from_i64(subtotal_minor).unwrap_or(Decimal::ZERO);

        Ok(Percentage::from(savings_dec / subtotal_dec))
    }

    /// Renders the priced cart as a receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        write_table(&mut out, self.line_table())?;

        if !self.applied_promotions.is_empty() {
            write_table(&mut out, self.promotion_table())?;
        }

        write_summary(&mut out, self)
    }

    fn line_table(&self) -> Builder {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Category", "Unit Price", "Qty", "Line Total"]);

        for (idx, line) in self.items.iter().enumerate() {
            let line_total = i64::from(line.quantity)
                .checked_mul(line.product.price.to_minor_units())
                .map_or_else(
                    || String::from("overflow"),
                    |minor| format!("{}", Money::from_minor(minor, self.currency)),
                );

            builder.push_record([
                format!("#{:<3}", idx + 1),
                line.product.name.clone(),
                line.product.category.clone(),
                format!("{}", line.product.price),
                line.quantity.to_string(),
                line_total,
            ]);
        }

        builder
    }

    fn promotion_table(&self) -> Builder {
        let mut builder = Builder::default();

        builder.push_record(["", "Promotion", "Detail", "", "", "Discount"]);

        for (idx, applied) in self.applied_promotions.iter().enumerate() {
            let discount = if applied.discount_amount.to_minor_units() == 0 {
                String::new()
            } else {
                format!("-{}", applied.discount_amount)
            };

            builder.push_record([
                format!("#{:<3}", idx + 1),
                applied.promotion_name.clone(),
                applied.description.clone().unwrap_or_default(),
                String::new(),
                String::new(),
                discount,
            ]);
        }

        builder
    }
}

fn write_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..6), Alignment::right());
    table.modify(Columns::new(2..3), color_dark_grey());

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_summary(out: &mut impl io::Write, priced: &PricedCart<'_>) -> Result<(), ReceiptError> {
    let savings = priced.savings()?;
    let savings_percent_points = percent_points_from_fractional_percentage(priced.savings_percent()?);

    let subtotal_label = " Subtotal:";
    let total_label = " \x1b[1mTotal:\x1b[0m";
    let savings_label = " Savings:";

    let subtotal_val = format!("{}  ", priced.subtotal());
    let total_val = format!("{}  ", priced.final_total());
    let savings_val = format!("({savings_percent_points:.2}%) {savings}  ");

    let label_width = visible_width(subtotal_label)
        .max(visible_width(total_label))
        .max(visible_width(savings_label));

    let value_width = visible_width(&subtotal_val)
        .max(visible_width(&total_val))
        .max(visible_width(&savings_val));

    write_summary_line(out, subtotal_label, &subtotal_val, label_width, value_width)?;

    write_summary_line(
        out,
        total_label,
        &format!("\x1b[1m{total_val}\x1b[0m"),
        label_width,
        value_width,
    )?;

    write_summary_line(out, savings_label, &savings_val, label_width, value_width)?;

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

/// Converts a fractional percentage to percent points for display.
fn percent_points_from_fractional_percentage(percentage: Percentage) -> Decimal {
    // `Percentage` is a fraction (e.g. 0.25), so multiply by 100 to print percent points.
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}

/// Wraps runs of UTF-8 box-drawing characters in ANSI dark-grey escape codes.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {}{value}",
        "",
        " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, KRW, USD};
    use smallvec::smallvec;
    use testresult::TestResult;

    use crate::{products::Product, tags::StringTagCollection};

    use super::*;

    fn line(id: &str, name: &str, price: i64, quantity: u32) -> CartLine<'static> {
        CartLine::new(
            Product {
                id: id.to_string(),
                name: name.to_string(),
                price: Money::from_minor(price, KRW),
                category: "skincare".to_string(),
                tags: StringTagCollection::empty(),
            },
            quantity,
        )
    }

    fn applied(id: &str, name: &str, minor: i64, description: Option<&str>) -> AppliedPromotion<'static> {
        AppliedPromotion {
            promotion_id: id.to_string(),
            promotion_name: name.to_string(),
            discount_amount: Money::from_minor(minor, KRW),
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn accessors_return_values_from_constructor() {
        let priced = PricedCart::new(
            vec![line("prod_101", "Birch Sunscreen", 25_000, 1)],
            Money::from_minor(25_000, KRW),
            smallvec![applied("promo_1", "Welcome", 5_000, None)],
            Money::from_minor(20_000, KRW),
        );

        assert_eq!(priced.subtotal(), Money::from_minor(25_000, KRW));
        assert_eq!(priced.final_total(), Money::from_minor(20_000, KRW));
        assert_eq!(priced.items().len(), 1);
        assert_eq!(priced.applied_promotions().len(), 1);
        assert_eq!(priced.currency(), KRW);
    }

    #[test]
    fn undiscounted_totals_match() {
        let priced = PricedCart::undiscounted(Vec::new(), Money::from_minor(0, KRW));

        assert_eq!(priced.final_total(), priced.subtotal());
        assert!(priced.applied_promotions().is_empty());
    }

    #[test]
    fn savings_is_subtotal_minus_final_total() -> TestResult {
        let priced = PricedCart::new(
            Vec::new(),
            Money::from_minor(300, GBP),
            smallvec![],
            Money::from_minor(250, GBP),
        );

        assert_eq!(priced.savings()?, Money::from_minor(50, GBP));

        Ok(())
    }

    #[test]
    fn savings_errors_on_currency_mismatch() {
        let priced = PricedCart::new(
            Vec::new(),
            Money::from_minor(300, GBP),
            smallvec![],
            Money::from_minor(250, USD),
        );

        assert_eq!(
            priced.savings(),
            Err(MoneyError::CurrencyMismatch {
                expected: GBP.iso_alpha_code,
                actual: USD.iso_alpha_code,
            })
        );
    }

    #[test]
    fn savings_percent_is_zero_when_subtotal_is_zero() -> TestResult {
        let priced = PricedCart::undiscounted(Vec::new(), Money::from_minor(0, GBP));

        assert_eq!(priced.savings_percent()?, Percentage::from(0.0));

        Ok(())
    }

    #[test]
    fn savings_percent_is_relative_to_subtotal() -> TestResult {
        let priced = PricedCart::new(
            Vec::new(),
            Money::from_minor(400, GBP),
            smallvec![],
            Money::from_minor(300, GBP),
        );

        let points = percent_points_from_fractional_percentage(priced.savings_percent()?);

        assert_eq!(points, Decimal::from(25));

        Ok(())
    }

    #[test]
    fn write_to_renders_lines_promotions_and_summary() -> TestResult {
        let priced = PricedCart::new(
            vec![
                line("prod_101", "Birch Sunscreen", 25_000, 2),
                line("prod_102", "Tea Tree Mask", 2_000, 1),
            ],
            Money::from_minor(52_000, KRW),
            smallvec![
                applied("promo_1", "Welcome Coupon", 5_000, None),
                applied("promo_2", "Summer Shipping", 0, Some("Free shipping")),
            ],
            Money::from_minor(47_000, KRW),
        );

        let mut out = Vec::new();
        priced.write_to(&mut out)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Birch Sunscreen"));
        assert!(output.contains("Tea Tree Mask"));
        assert!(output.contains("Welcome Coupon"));
        assert!(output.contains("Free shipping"));
        assert!(output.contains(&format!("-{}", Money::from_minor(5_000, KRW))));
        assert!(output.contains(&format!("{}", Money::from_minor(47_000, KRW))));
        assert!(output.contains("Savings:"));

        Ok(())
    }

    #[test]
    fn write_to_omits_promotion_table_when_nothing_applied() -> TestResult {
        let priced = PricedCart::undiscounted(
            vec![line("prod_101", "Birch Sunscreen", 25_000, 1)],
            Money::from_minor(25_000, KRW),
        );

        let mut out = Vec::new();
        priced.write_to(&mut out)?;

        let output = String::from_utf8(out)?;

        assert!(!output.contains("Promotion"));
        assert!(output.contains("(0.00%)"));

        Ok(())
    }

    #[test]
    fn visible_width_ignores_ansi_sequences() {
        assert_eq!(visible_width("\x1b[1mTotal:\x1b[0m"), 6);
    }

    #[test]
    fn colorize_borders_wraps_box_runs() {
        assert_eq!(colorize_borders("─┼a"), "\x1b[90m─┼\x1b[0ma");
    }
}
