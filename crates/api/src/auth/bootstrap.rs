//! First-run admin account.

use sitecrm_core::error::CoreError;
use sitecrm_core::roles::ROLE_ADMIN;
use sitecrm_db::models::user::{CreateUser, User};
use sitecrm_db::repositories::{RoleRepo, UserRepo};
use sitecrm_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::config::AdminBootstrap;
use crate::error::{AppError, AppResult};

/// Create the configured admin if the `users` table is empty.
///
/// Returns the new user, or `None` when any user already exists. The
/// password goes through the same strength check and Argon2id hashing as
/// `POST /auth/register`.
pub async fn ensure_admin(pool: &DbPool, admin: &AdminBootstrap) -> AppResult<Option<User>> {
    if UserRepo::count(pool).await? > 0 {
        return Ok(None);
    }

    validate_password_strength(&admin.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let role = RoleRepo::find_by_name(pool, ROLE_ADMIN)
        .await?
        .ok_or_else(|| AppError::InternalError(format!("Role '{ROLE_ADMIN}' is not seeded")))?;

    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: admin.username.clone(),
            email: admin.email.clone(),
            password_hash,
            role_id: role.id,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "Bootstrap admin created");
    Ok(Some(user))
}
