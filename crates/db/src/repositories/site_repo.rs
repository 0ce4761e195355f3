//! Repository for the `sites` table.

use sitecrm_core::types::DbId;
use sqlx::MySqlPool;

use crate::models::site::{CreateSite, Site, UpdateSite};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, url, username, app_password, is_active, created_at, updated_at";

/// Provides CRUD operations for sites.
pub struct SiteRepo;

impl SiteRepo {
    /// Insert a new site, returning the created row.
    pub async fn create(pool: &MySqlPool, input: &CreateSite) -> Result<Site, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO sites (name, url, username, app_password) VALUES (?, ?, ?, ?)",
        )
        .bind(&input.name)
        .bind(&input.url)
        .bind(&input.username)
        .bind(&input.app_password)
        .execute(pool)
        .await?;

        Self::find_by_id(pool, result.last_insert_id() as DbId)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find a site by ID.
    pub async fn find_by_id(pool: &MySqlPool, id: DbId) -> Result<Option<Site>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sites WHERE id = ?");
        sqlx::query_as::<_, Site>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all sites ordered by name.
    pub async fn list(pool: &MySqlPool) -> Result<Vec<Site>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sites ORDER BY name ASC");
        sqlx::query_as::<_, Site>(&query).fetch_all(pool).await
    }

    /// Update a site. Only non-`None` fields in `input` are applied, except
    /// that `clear_credentials` nulls both credential columns.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &MySqlPool,
        id: DbId,
        input: &UpdateSite,
    ) -> Result<Option<Site>, sqlx::Error> {
        sqlx::query(
            "UPDATE sites SET
                name = COALESCE(?, name),
                url = COALESCE(?, url),
                username = CASE WHEN ? THEN NULL ELSE COALESCE(?, username) END,
                app_password = CASE WHEN ? THEN NULL ELSE COALESCE(?, app_password) END,
                is_active = COALESCE(?, is_active)
             WHERE id = ?",
        )
        .bind(&input.name)
        .bind(&input.url)
        .bind(input.clear_credentials)
        .bind(&input.username)
        .bind(input.clear_credentials)
        .bind(&input.app_password)
        .bind(input.is_active)
        .bind(id)
        .execute(pool)
        .await?;

        Self::find_by_id(pool, id).await
    }

    /// Delete a site. Returns `true` if a row was removed.
    pub async fn delete(pool: &MySqlPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sites WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
