//! Repository for the `permissions` and `role_permissions` tables.

use sitecrm_core::types::DbId;
use sqlx::MySqlPool;

use crate::models::permission::{CreatePermission, Permission};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, created_at";

/// Provides permission CRUD and role assignment.
pub struct PermissionRepo;

impl PermissionRepo {
    /// Insert a new permission, returning the created row.
    pub async fn create(
        pool: &MySqlPool,
        input: &CreatePermission,
    ) -> Result<Permission, sqlx::Error> {
        let result = sqlx::query("INSERT INTO permissions (name, description) VALUES (?, ?)")
            .bind(&input.name)
            .bind(&input.description)
            .execute(pool)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM permissions WHERE id = ?");
        sqlx::query_as::<_, Permission>(&query)
            .bind(result.last_insert_id() as DbId)
            .fetch_one(pool)
            .await
    }

    /// List all permissions ordered by name.
    pub async fn list(pool: &MySqlPool) -> Result<Vec<Permission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM permissions ORDER BY name ASC");
        sqlx::query_as::<_, Permission>(&query).fetch_all(pool).await
    }

    /// Delete a permission (role assignments cascade). Returns `true` if removed.
    pub async fn delete(pool: &MySqlPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permissions granted to a role, ordered by name.
    pub async fn list_for_role(
        pool: &MySqlPool,
        role_id: DbId,
    ) -> Result<Vec<Permission>, sqlx::Error> {
        sqlx::query_as::<_, Permission>(
            "SELECT p.id, p.name, p.description, p.created_at
             FROM permissions p
             JOIN role_permissions rp ON rp.permission_id = p.id
             WHERE rp.role_id = ?
             ORDER BY p.name ASC",
        )
        .bind(role_id)
        .fetch_all(pool)
        .await
    }

    /// Permission names granted to a user through their role.
    pub async fn names_for_user(
        pool: &MySqlPool,
        user_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT p.name
             FROM users u
             JOIN role_permissions rp ON rp.role_id = u.role_id
             JOIN permissions p ON p.id = rp.permission_id
             WHERE u.id = ?
             ORDER BY p.name ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Replace the permission set of a role in one transaction.
    pub async fn set_for_role(
        pool: &MySqlPool,
        role_id: DbId,
        permission_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = ?")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        for permission_id in permission_ids {
            sqlx::query("INSERT INTO role_permissions (role_id, permission_id) VALUES (?, ?)")
                .bind(role_id)
                .bind(*permission_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await
    }
}
