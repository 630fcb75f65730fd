//! User entity model and DTOs.

use coursecraft_core::tier::Tier;
use coursecraft_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub subscription_tier: String,
    pub remaining_generations: i32,
    pub last_generation_at: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Parsed tier. The column is constrained to valid values, so an
    /// unparseable value only happens on a corrupted row.
    pub fn tier(&self) -> Tier {
        self.subscription_tier.parse().unwrap_or_else(|_| {
            tracing::warn!(user_id = self.id, tier = %self.subscription_tier, "Unknown tier, treating as free");
            Tier::Free
        })
    }
}

/// Subscription summary shown on the account page.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionInfo {
    pub tier: Tier,
    /// `None` for unlimited tiers.
    pub remaining_generations: Option<i32>,
    pub generation_quota: Option<i32>,
    pub last_generation_at: Option<Timestamp>,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub subscription: SubscriptionInfo,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        let tier = user.tier();
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            is_active: user.is_active,
            subscription: SubscriptionInfo {
                tier,
                remaining_generations: (!tier.is_unlimited()).then_some(user.remaining_generations),
                generation_quota: tier.generation_quota(),
                last_generation_at: user.last_generation_at,
            },
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub tier: Tier,
}
