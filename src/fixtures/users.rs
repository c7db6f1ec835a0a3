//! User Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::users::{MembershipTier, UserProfile};

/// Wrapper for users in YAML
#[derive(Debug, Deserialize)]
pub struct UsersFixture {
    /// Map of user id -> user fixture
    pub users: FxHashMap<String, UserFixture>,
}

/// User Fixture
#[derive(Debug, Clone, Deserialize)]
pub struct UserFixture {
    /// Display name
    pub name: String,

    /// Membership tier (bronze, silver, gold or vip)
    pub membership_tier: MembershipTier,

    /// Whether this is the user's first order
    #[serde(default)]
    pub is_new_user: bool,

    /// Region code
    #[serde(default)]
    pub region: Option<String>,

    /// Age in years
    #[serde(default)]
    pub age: Option<u32>,
}

impl UserFixture {
    /// Convert to a [`UserProfile`] with the given id.
    pub fn into_profile(self, id: String) -> UserProfile {
        UserProfile {
            id,
            name: self.name,
            membership_tier: self.membership_tier,
            is_new_user: self.is_new_user,
            region: self.region,
            age: self.age,
        }
    }
}
