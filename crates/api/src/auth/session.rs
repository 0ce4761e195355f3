//! Session store seam.
//!
//! Every authenticated request asks the store whether its token's session is
//! still active. Production uses [`MySqlSessionStore`]; tests substitute an
//! in-memory store through [`AppState`](crate::state::AppState).

use async_trait::async_trait;
use sitecrm_core::types::DbId;
use sitecrm_db::models::session::CreateSession;
use sitecrm_db::repositories::SessionRepo;
use sitecrm_db::DbPool;

/// Persistent `{token hash -> active}` records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Record a new active session for `user_id`.
    async fn create(&self, user_id: DbId, token_hash: &str) -> Result<(), sqlx::Error>;

    /// Whether the session exists and has not been invalidated.
    async fn is_active(&self, token_hash: &str) -> Result<bool, sqlx::Error>;

    /// Invalidate one session. Returns `true` if it was active.
    async fn invalidate(&self, token_hash: &str) -> Result<bool, sqlx::Error>;

    /// Invalidate every session of a user. Returns how many were active.
    async fn invalidate_user(&self, user_id: DbId) -> Result<u64, sqlx::Error>;
}

/// [`SessionStore`] backed by the `sessions` table.
pub struct MySqlSessionStore {
    pool: DbPool,
}

impl MySqlSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for MySqlSessionStore {
    async fn create(&self, user_id: DbId, token_hash: &str) -> Result<(), sqlx::Error> {
        let input = CreateSession {
            user_id,
            token_hash: token_hash.to_string(),
        };
        SessionRepo::create(&self.pool, &input).await?;
        Ok(())
    }

    async fn is_active(&self, token_hash: &str) -> Result<bool, sqlx::Error> {
        SessionRepo::is_active(&self.pool, token_hash).await
    }

    async fn invalidate(&self, token_hash: &str) -> Result<bool, sqlx::Error> {
        SessionRepo::deactivate(&self.pool, token_hash).await
    }

    async fn invalidate_user(&self, user_id: DbId) -> Result<u64, sqlx::Error> {
        SessionRepo::deactivate_all_for_user(&self.pool, user_id).await
    }
}
