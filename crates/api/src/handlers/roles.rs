//! Handlers for the `/roles` resource.
//!
//! Reads need any authenticated user; writes need `roles.manage`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sitecrm_core::error::CoreError;
use sitecrm_core::permissions::ROLES_MANAGE;
use sitecrm_core::types::DbId;
use sitecrm_db::models::permission::Permission;
use sitecrm_db::models::role::{CreateRole, Role, UpdateRole};
use sitecrm_db::repositories::{PermissionRepo, RoleRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_permission;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /roles/{id}/permissions`.
#[derive(Debug, Deserialize)]
pub struct SetPermissionsRequest {
    pub permission_ids: Vec<DbId>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Role", id })
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Role name must not be empty".into(),
        )));
    }
    Ok(())
}

/// GET /api/roles
pub async fn list_roles(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Role>>>> {
    let roles = RoleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: roles }))
}

/// GET /api/roles/{id}
pub async fn get_role(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Role>>> {
    let role = RoleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: role }))
}

/// POST /api/roles
pub async fn create_role(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateRole>,
) -> AppResult<(StatusCode, Json<DataResponse<Role>>)> {
    require_permission(&state.pool, user.id, ROLES_MANAGE).await?;
    validate_name(&input.name)?;
    let role = RoleRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: role })))
}

/// PUT /api/roles/{id}
pub async fn update_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRole>,
) -> AppResult<Json<DataResponse<Role>>> {
    require_permission(&state.pool, user.id, ROLES_MANAGE).await?;
    if let Some(name) = &input.name {
        validate_name(name)?;
    }
    let role = RoleRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: role }))
}

/// DELETE /api/roles/{id}
///
/// Roles still assigned to users cannot be deleted (409).
pub async fn delete_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    require_permission(&state.pool, user.id, ROLES_MANAGE).await?;
    if !RoleRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/roles/{id}/permissions
pub async fn get_role_permissions(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Permission>>>> {
    RoleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let permissions = PermissionRepo::list_for_role(&state.pool, id).await?;
    Ok(Json(DataResponse { data: permissions }))
}

/// PUT /api/roles/{id}/permissions
///
/// Replace the role's permission set.
pub async fn set_role_permissions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<SetPermissionsRequest>,
) -> AppResult<Json<DataResponse<Vec<Permission>>>> {
    require_permission(&state.pool, user.id, ROLES_MANAGE).await?;
    RoleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let mut permission_ids = input.permission_ids;
    permission_ids.sort_unstable();
    permission_ids.dedup();

    PermissionRepo::set_for_role(&state.pool, id, &permission_ids).await?;
    let permissions = PermissionRepo::list_for_role(&state.pool, id).await?;
    Ok(Json(DataResponse { data: permissions }))
}
