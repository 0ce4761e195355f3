//! Repository for the `users` table.

use sitecrm_core::types::DbId;
use sqlx::MySqlPool;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, username, email, password_hash, role_id, is_active, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &MySqlPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, role_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(input.role_id)
        .execute(pool)
        .await?;

        Self::find_by_id(pool, result.last_insert_id() as DbId)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &MySqlPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = ?");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username.
    pub async fn find_by_username(
        pool: &MySqlPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = ?");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Number of user rows, active or not.
    pub async fn count(pool: &MySqlPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }

    /// Role name of a user, or `None` if the user does not exist.
    pub async fn role_name(pool: &MySqlPool, user_id: DbId) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT r.name FROM users u JOIN roles r ON r.id = u.role_id WHERE u.id = ?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }
}
