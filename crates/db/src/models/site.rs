//! Site entity model and DTOs.

use serde::{Deserialize, Serialize};
use sitecrm_core::credentials::Credential;
use sitecrm_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `sites` table.
///
/// `username` + `app_password` form the optional site-level credential.
/// Never serialize this directly; use [`SiteResponse`].
#[derive(Debug, Clone, FromRow)]
pub struct Site {
    pub id: DbId,
    pub name: String,
    pub url: String,
    pub username: Option<String>,
    pub app_password: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Site {
    /// The stored site-level credential, when both parts are present.
    pub fn stored_credential(&self) -> Option<Credential> {
        Credential::basic(self.username.as_deref(), self.app_password.as_deref())
    }
}

/// Site representation for API responses (no stored password).
#[derive(Debug, Clone, Serialize)]
pub struct SiteResponse {
    pub id: DbId,
    pub name: String,
    pub url: String,
    pub username: Option<String>,
    pub has_credentials: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Site> for SiteResponse {
    fn from(site: &Site) -> Self {
        Self {
            id: site.id,
            name: site.name.clone(),
            url: site.url.clone(),
            username: site.username.clone(),
            has_credentials: site.stored_credential().is_some(),
            is_active: site.is_active,
            created_at: site.created_at,
            updated_at: site.updated_at,
        }
    }
}

/// DTO for creating a site. `url` is expected to be normalized already.
#[derive(Debug)]
pub struct CreateSite {
    pub name: String,
    pub url: String,
    pub username: Option<String>,
    pub app_password: Option<String>,
}

/// DTO for updating a site. All fields are optional.
///
/// `clear_credentials` sets both credential columns to `NULL` and wins over
/// `username`/`app_password`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSite {
    pub name: Option<String>,
    pub url: Option<String>,
    pub username: Option<String>,
    pub app_password: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub clear_credentials: bool,
}
