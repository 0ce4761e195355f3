//! Permission entity model and DTOs.

use serde::{Deserialize, Serialize};
use sitecrm_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `permissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Permission {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a permission.
#[derive(Debug, Deserialize)]
pub struct CreatePermission {
    pub name: String,
    pub description: Option<String>,
}
