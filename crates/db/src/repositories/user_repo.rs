//! Repository for the `users` table.

use coursecraft_core::tier::Tier;
use coursecraft_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, password_hash, role, subscription_tier, \
                        remaining_generations, last_generation_at, is_active, created_at, updated_at";

/// Provides account and subscription operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row. The generation counter
    /// starts at the tier's quota.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, role, subscription_tier, remaining_generations)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .bind(input.tier.as_str())
            .bind(input.tier.initial_remaining())
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Move a user onto `tier` and reset the counter to its quota.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_subscription(
        pool: &PgPool,
        id: DbId,
        tier: Tier,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET subscription_tier = $2, remaining_generations = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(tier.as_str())
            .bind(tier.initial_remaining())
            .fetch_optional(pool)
            .await
    }

    /// Spend one generation and stamp `last_generation_at`, in one statement.
    ///
    /// Premium users are stamped but never decremented. Returns `None` when
    /// the user is missing, inactive, or has nothing left.
    pub async fn consume_generation(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                remaining_generations = CASE
                    WHEN subscription_tier = 'premium' THEN remaining_generations
                    ELSE remaining_generations - 1
                END,
                last_generation_at = NOW()
             WHERE id = $1
               AND is_active = true
               AND (subscription_tier = 'premium' OR remaining_generations > 0)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Give back a generation spent on a request that produced no job.
    pub async fn refund_generation(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET remaining_generations = remaining_generations + 1
             WHERE id = $1 AND subscription_tier <> 'premium'",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
