//! Handlers for the `/auth` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sitecrm_core::error::CoreError;
use sitecrm_core::permissions::USERS_MANAGE;
use sitecrm_core::types::DbId;
use sitecrm_db::models::user::{CreateUser, UserResponse};
use sitecrm_db::repositories::{PermissionRepo, RoleRepo, UserRepo};

use crate::auth::jwt::{generate_token, hash_token};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{require_permission, AuthProfile};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role_id: DbId,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Identity carried by the presented token.
#[derive(Debug, Serialize)]
pub struct TokenIdentity {
    pub id: DbId,
    pub username: String,
}

/// Response for `GET /auth/verify`.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: TokenIdentity,
}

/// Response for `GET /auth/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: DbId,
    pub username: String,
    pub role: String,
    pub is_team_member: bool,
    pub permissions: Vec<String>,
}

/// Response for `POST /auth/users/{id}/invalidate-sessions`.
#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub user_id: DbId,
    pub invalidated: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/login
///
/// Verify username + password, sign a token and record its session.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid username or password"))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(username = %input.username, "Failed login attempt");
        return Err(AppError::unauthorized("Invalid username or password"));
    }

    let token = generate_token(user.id, &user.username, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    state.sessions.create(user.id, &hash_token(&token)).await?;

    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    tracing::info!(user_id = user.id, %role, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            role,
            is_active: user.is_active,
        },
    }))
}

/// POST /api/auth/register
///
/// Create a user. Requires `users.manage`.
pub async fn register(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    require_permission(&state.pool, user.id, USERS_MANAGE).await?;
    if input.username.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Username must not be empty".into(),
        )));
    }
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let role = RoleRepo::find_by_id(&state.pool, input.role_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Role",
            id: input.role_id,
        }))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let created = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username.trim().to_string(),
            email: input.email,
            password_hash,
            role_id: role.id,
        },
    )
    .await?;

    tracing::info!(actor_id = user.id, user_id = created.id, role = %role.name, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: created.id,
            username: created.username,
            email: created.email,
            role: role.name,
            is_active: created.is_active,
        }),
    ))
}

/// POST /api/auth/logout
///
/// Invalidate the presented token's session and drop the user's site state.
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> AppResult<StatusCode> {
    state.sessions.invalidate(&user.token_hash).await?;
    state.site_logins.forget_user(user.id).await;
    state.site_context.clear(user.id).await;

    tracing::info!(user_id = user.id, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/verify
///
/// Confirms the token is valid and its session active.
pub async fn verify(user: AuthUser) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        valid: true,
        user: TokenIdentity {
            id: user.id,
            username: user.username,
        },
    })
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, profile: AuthProfile) -> AppResult<Json<MeResponse>> {
    let permissions = PermissionRepo::names_for_user(&state.pool, profile.user.id).await?;

    Ok(Json(MeResponse {
        id: profile.user.id,
        username: profile.user.username,
        is_team_member: profile.role.is_team_member(),
        role: profile.role.to_string(),
        permissions,
    }))
}

/// POST /api/auth/users/{id}/invalidate-sessions
///
/// Force every session of a user inactive. Requires `users.manage`.
pub async fn invalidate_sessions(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<InvalidateResponse>> {
    require_permission(&state.pool, actor.id, USERS_MANAGE).await?;

    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;

    let invalidated = state.sessions.invalidate_user(user_id).await?;
    state.site_logins.forget_user(user_id).await;
    state.site_context.clear(user_id).await;

    tracing::info!(actor_id = actor.id, user_id, invalidated, "Sessions invalidated");
    Ok(Json(InvalidateResponse {
        user_id,
        invalidated,
    }))
}
