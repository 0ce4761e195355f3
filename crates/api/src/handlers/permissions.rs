//! Handlers for the `/permissions` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use sitecrm_core::error::CoreError;
use sitecrm_core::permissions::ROLES_MANAGE;
use sitecrm_core::types::DbId;
use sitecrm_db::models::permission::{CreatePermission, Permission};
use sitecrm_db::repositories::PermissionRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_permission;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/permissions
pub async fn list_permissions(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Permission>>>> {
    let permissions = PermissionRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: permissions }))
}

/// GET /api/permissions/me
///
/// Permission names granted to the caller through their role.
pub async fn my_permissions(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let names = PermissionRepo::names_for_user(&state.pool, user.id).await?;
    Ok(Json(DataResponse { data: names }))
}

/// POST /api/permissions
pub async fn create_permission(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreatePermission>,
) -> AppResult<(StatusCode, Json<DataResponse<Permission>>)> {
    require_permission(&state.pool, user.id, ROLES_MANAGE).await?;
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Permission name must not be empty".into(),
        )));
    }
    let permission = PermissionRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: permission })))
}

/// DELETE /api/permissions/{id}
pub async fn delete_permission(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    require_permission(&state.pool, user.id, ROLES_MANAGE).await?;
    if !PermissionRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Permission",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
