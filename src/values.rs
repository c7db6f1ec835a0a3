//! Rule Values
//!
//! Rule authors write thresholds and discount amounts as strings. [`RuleValue`] keeps the
//! raw text and parses it strictly at evaluation time, so a malformed value can only ever
//! make a rule fail to match.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;

/// A raw value from a promotion rule (e.g. `"50000"`, `"vip"`, `"true"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RuleValue(String);

impl RuleValue {
    /// Wrap a raw rule value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse as a decimal number. Surrounding whitespace is ignored; anything else that is
    /// not a plain decimal literal yields `None`.
    pub fn decimal(&self) -> Option<Decimal> {
        let trimmed = self.0.trim();

        if trimmed.is_empty() {
            return None;
        }

        Decimal::from_str(trimmed).ok()
    }

    /// Parse as an integer. Fractional or non-numeric text yields `None`.
    pub fn integer(&self) -> Option<i64> {
        self.0.trim().parse::<i64>().ok()
    }

    /// Parse as a boolean literal (`"true"` or `"false"`).
    pub fn boolean(&self) -> Option<bool> {
        match self.0.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RuleValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RuleValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for RuleValue {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<Decimal> for RuleValue {
    fn from(value: Decimal) -> Self {
        Self(value.to_string())
    }
}
