//! Repository for the `accounts` table.

use keepsake_core::types::DbId;
use sqlx::PgPool;

use crate::models::account::Account;

const COLUMNS: &str = "id, email, display_name, quota_exempt, created_at, updated_at";

/// Provides lookups for accounts. Account provisioning itself belongs to
/// the identity system; this service only needs to resolve acting
/// accounts and their quota exemption flag.
pub struct AccountRepo;

impl AccountRepo {
    /// Insert an account row. Used by seeds and tests.
    pub async fn create(
        pool: &PgPool,
        email: &str,
        display_name: &str,
    ) -> Result<Account, sqlx::Error> {
        let query = format!(
            "INSERT INTO accounts (email, display_name) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(email)
            .bind(display_name)
            .fetch_one(pool)
            .await
    }

    /// Find an account by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE id = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Flip the quota-exempt flag. Returns the updated row if it exists.
    pub async fn set_quota_exempt(
        pool: &PgPool,
        id: DbId,
        exempt: bool,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET quota_exempt = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(exempt)
            .fetch_optional(pool)
            .await
    }
}
