//! Role-based access control (RBAC) extractors.
//!
//! Tokens carry only id and username, so the role and its permission grants
//! are looked up after [`AuthUser`] has accepted the token. Access to leads,
//! sites, roles and users is decided by permission name (see
//! `sitecrm_core::permissions`), never by role name.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sitecrm_core::error::CoreError;
use sitecrm_core::filter::Profile;
use sitecrm_core::roles::Role;
use sitecrm_core::types::DbId;
use sitecrm_db::repositories::{PermissionRepo, UserRepo};
use sitecrm_db::DbPool;

use super::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// An authenticated user together with their current role.
#[derive(Debug, Clone)]
pub struct AuthProfile {
    pub user: AuthUser,
    pub role: Role,
}

impl AuthProfile {
    /// Load the role for an already-authenticated user.
    ///
    /// A valid token for a user that no longer exists is rejected with 401.
    pub async fn load(pool: &DbPool, user: AuthUser) -> AppResult<Self> {
        let role_name = UserRepo::role_name(pool, user.id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;
        Ok(Self {
            user,
            role: Role::from(role_name),
        })
    }

    /// The profile the row-level data filter works with.
    pub fn profile(&self) -> Profile {
        Profile::new(self.user.id, self.role.clone())
    }
}

impl FromRequestParts<AppState> for AuthProfile {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        AuthProfile::load(&state.pool, user).await
    }
}

/// Reject with 403 unless the user's role grants `permission`.
///
/// ```ignore
/// async fn create_site(State(state): State<AppState>, user: AuthUser) -> AppResult<StatusCode> {
///     require_permission(&state.pool, user.id, SITES_MANAGE).await?;
///     Ok(StatusCode::CREATED)
/// }
/// ```
pub async fn require_permission(pool: &DbPool, user_id: DbId, permission: &str) -> AppResult<()> {
    let granted = PermissionRepo::names_for_user(pool, user_id).await?;
    if !granted.iter().any(|name| name == permission) {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Permission '{permission}' required"
        ))));
    }
    Ok(())
}
