//! Bearer-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use sitecrm_core::error::CoreError;
use sitecrm_core::types::DbId;

use crate::auth::jwt::{hash_token, validate_token, JwtConfig};
use crate::auth::session::SessionStore;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated identity taken from a valid, active bearer token.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.id, username = %user.username, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from the token payload).
    pub id: DbId,
    /// The username the token was issued to.
    pub username: String,
    /// Hash of the presented token; identifies the session row.
    pub token_hash: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(&parts.headers, &state.config.jwt, state.sessions.as_ref()).await
    }
}

/// Gate a request on its `Authorization` header.
///
/// 1. Missing or non-`Bearer` header, or an empty token: `Unauthorized`.
///    The session store is not consulted.
/// 2. Token fails signature/structure/expiry checks: `Unauthorized`.
/// 3. Session not active: `SessionInvalidated`.
pub async fn authenticate(
    headers: &HeaderMap,
    jwt: &JwtConfig,
    sessions: &dyn SessionStore,
) -> Result<AuthUser, AppError> {
    let token = bearer_token(headers)?;

    let claims = validate_token(token, jwt).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AppError::unauthorized("Invalid or expired token")
    })?;

    let token_hash = hash_token(token);
    if !sessions.is_active(&token_hash).await? {
        tracing::debug!(user_id = claims.id, "Token presented for invalidated session");
        return Err(AppError::Core(CoreError::SessionInvalidated));
    }

    Ok(AuthUser {
        id: claims.id,
        username: claims.username,
        token_hash,
    })
}

/// Pull the token out of `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            AppError::unauthorized("Invalid Authorization format. Expected: Bearer <token>")
        })
}
