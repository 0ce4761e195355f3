//! Login session model and DTOs.

use sitecrm_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `sessions` table.
///
/// Only the SHA-256 digest of the identity token is stored.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub token_hash: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new session.
pub struct CreateSession {
    pub user_id: DbId,
    pub token_hash: String,
}
