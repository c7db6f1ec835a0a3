//! Users

use std::fmt;

use serde::Deserialize;

/// Membership tier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipTier {
    /// Bronze
    Bronze,

    /// Silver
    Silver,

    /// Gold
    Gold,

    /// VIP
    Vip,
}

impl MembershipTier {
    /// Return the tier as it is written in promotion rules.
    pub const fn as_str(self) -> &'static str {
        match self {
            MembershipTier::Bronze => "bronze",
            MembershipTier::Silver => "silver",
            MembershipTier::Gold => "gold",
            MembershipTier::Vip => "vip",
        }
    }
}

impl fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The shopper a cart is being priced for.
///
/// Supplied whole for every evaluation; the engine never mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// User id
    pub id: String,

    /// Display name
    pub name: String,

    /// Membership tier
    pub membership_tier: MembershipTier,

    /// Whether this is the user's first order
    pub is_new_user: bool,

    /// Region code, when known
    pub region: Option<String>,

    /// Age in years, when known
    pub age: Option<u32>,
}

impl UserProfile {
    /// Create a profile with no optional fields set.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        membership_tier: MembershipTier,
        is_new_user: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            membership_tier,
            is_new_user,
            region: None,
            age: None,
        }
    }

    /// Set the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the age.
    #[must_use]
    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }
}
