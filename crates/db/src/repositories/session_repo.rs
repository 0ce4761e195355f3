//! Repository for the `sessions` table.

use sitecrm_core::types::DbId;
use sqlx::MySqlPool;

use crate::models::session::{CreateSession, Session};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token_hash, is_active, created_at, updated_at";

/// Provides session bookkeeping keyed by token hash.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new active session, returning the created row.
    pub async fn create(pool: &MySqlPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let result = sqlx::query("INSERT INTO sessions (user_id, token_hash) VALUES (?, ?)")
            .bind(input.user_id)
            .bind(&input.token_hash)
            .execute(pool)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM sessions WHERE id = ?");
        sqlx::query_as::<_, Session>(&query)
            .bind(result.last_insert_id() as DbId)
            .fetch_one(pool)
            .await
    }

    /// Whether the session for `token_hash` exists and is still active.
    pub async fn is_active(pool: &MySqlPool, token_hash: &str) -> Result<bool, sqlx::Error> {
        let active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM sessions WHERE token_hash = ?")
                .bind(token_hash)
                .fetch_optional(pool)
                .await?;
        Ok(active.unwrap_or(false))
    }

    /// Flag one session inactive. Returns `true` if a row changed.
    pub async fn deactivate(pool: &MySqlPool, token_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET is_active = FALSE WHERE token_hash = ? AND is_active = TRUE",
        )
        .bind(token_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flag every active session of a user inactive. Returns the count.
    pub async fn deactivate_all_for_user(
        pool: &MySqlPool,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET is_active = FALSE WHERE user_id = ? AND is_active = TRUE",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete inactive sessions. Returns the count of deleted rows.
    pub async fn purge_inactive(pool: &MySqlPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE is_active = FALSE")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
