//! Handlers for the `/sites` resource: site CRUD, the caller's current site,
//! and per-site logins.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sitecrm_core::credentials::Credential;
use sitecrm_core::error::CoreError;
use sitecrm_core::permissions::SITES_MANAGE;
use sitecrm_core::site_url::{normalize_base_url, rest_root, wp_rest_url, wp_url};
use sitecrm_core::types::{DbId, Timestamp};
use sitecrm_db::models::site::{CreateSite, Site, SiteResponse, UpdateSite};
use sitecrm_db::repositories::SiteRepo;
use sitecrm_wp::WpError;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_permission;
use crate::response::DataResponse;
use crate::site_client::{current_site, resolve_site_credential};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /sites`.
#[derive(Debug, Deserialize)]
pub struct CreateSiteRequest {
    pub name: String,
    pub url: String,
    pub username: Option<String>,
    pub app_password: Option<String>,
}

/// Request body for `POST /sites/{id}/login`.
#[derive(Debug, Deserialize)]
pub struct SiteLoginRequest {
    pub username: String,
    pub password: String,
}

/// Response for `GET /sites/current` and `POST /sites/{id}/select`.
#[derive(Debug, Serialize)]
pub struct CurrentSiteResponse {
    pub site: Option<SiteResponse>,
    pub wp_url: String,
    pub wp_rest_url: String,
    /// Which credential tier requests would use, `null` when unauthenticated.
    pub credential_tier: Option<&'static str>,
}

/// Response for `POST /sites/{id}/login`.
#[derive(Debug, Serialize)]
pub struct SiteLoginResponse {
    pub site_id: DbId,
    pub expires_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Site", id })
}

/// Normalize a user-supplied URL, rejecting blanks.
fn clean_url(raw: &str) -> AppResult<String> {
    let url = normalize_base_url(raw);
    if url.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Site URL must not be empty".into(),
        )));
    }
    Ok(url)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn find_site(state: &AppState, id: DbId) -> AppResult<Site> {
    SiteRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Only active sites can be selected or logged into.
fn ensure_active(site: &Site) -> AppResult<()> {
    if !site.is_active {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Site {} is inactive",
            site.id
        ))));
    }
    Ok(())
}

async fn current_site_response(state: &AppState, user_id: DbId) -> AppResult<CurrentSiteResponse> {
    let site = current_site(state, user_id).await?;
    let site_url = site.as_ref().map(|s| s.url.as_str());
    let legacy_url = state.config.wp.legacy_url.as_deref();

    let credential = resolve_site_credential(state, user_id, site.as_ref()).await;

    Ok(CurrentSiteResponse {
        wp_url: wp_url(site_url, legacy_url),
        wp_rest_url: wp_rest_url(site_url, legacy_url),
        credential_tier: credential.map(|c| c.tier.as_str()),
        site: site.as_ref().map(SiteResponse::from),
    })
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/sites
pub async fn list_sites(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<SiteResponse>>>> {
    let sites = SiteRepo::list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: sites.iter().map(SiteResponse::from).collect(),
    }))
}

/// GET /api/sites/{id}
pub async fn get_site(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SiteResponse>>> {
    let site = find_site(&state, id).await?;
    Ok(Json(DataResponse {
        data: SiteResponse::from(&site),
    }))
}

/// POST /api/sites
pub async fn create_site(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(input): Json<CreateSiteRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SiteResponse>>)> {
    require_permission(&state.pool, actor.id, SITES_MANAGE).await?;
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Site name must not be empty".into(),
        )));
    }

    let site = SiteRepo::create(
        &state.pool,
        &CreateSite {
            name: input.name.trim().to_string(),
            url: clean_url(&input.url)?,
            username: non_blank(input.username),
            app_password: non_blank(input.app_password),
        },
    )
    .await?;

    tracing::info!(actor_id = actor.id, site_id = site.id, url = %site.url, "Site created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SiteResponse::from(&site),
        }),
    ))
}

/// PUT /api/sites/{id}
///
/// A changed URL drops every per-site login for the site, since those were
/// verified against the old address. `clear_credentials` removes the stored
/// site credential; blank `username`/`app_password` leave it unchanged.
pub async fn update_site(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateSite>,
) -> AppResult<Json<DataResponse<SiteResponse>>> {
    require_permission(&state.pool, user.id, SITES_MANAGE).await?;
    let existing = find_site(&state, id).await?;

    if let Some(url) = input.url.take() {
        input.url = Some(clean_url(&url)?);
    }
    input.username = non_blank(input.username);
    input.app_password = non_blank(input.app_password);
    if input.clear_credentials && (input.username.is_some() || input.app_password.is_some()) {
        return Err(AppError::Core(CoreError::Validation(
            "clear_credentials cannot be combined with new credentials".into(),
        )));
    }

    let site = SiteRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    if site.url != existing.url {
        state.site_logins.forget_site(id).await;
    }
    if !site.is_active {
        state.site_context.forget_site(id).await;
    }
    if input.clear_credentials {
        tracing::info!(actor_id = user.id, site_id = id, "Site credentials cleared");
    }

    Ok(Json(DataResponse {
        data: SiteResponse::from(&site),
    }))
}

/// DELETE /api/sites/{id}
pub async fn delete_site(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    require_permission(&state.pool, actor.id, SITES_MANAGE).await?;
    if !SiteRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }

    let cleared = state.site_context.forget_site(id).await;
    state.site_logins.forget_site(id).await;

    tracing::info!(actor_id = actor.id, site_id = id, cleared = cleared.len(), "Site deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Current site
// ---------------------------------------------------------------------------

/// GET /api/sites/current
pub async fn current(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<CurrentSiteResponse>> {
    Ok(Json(current_site_response(&state, user.id).await?))
}

/// POST /api/sites/{id}/select
///
/// Make an active site the caller's current site.
pub async fn select_site(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<CurrentSiteResponse>> {
    let site = find_site(&state, id).await?;
    ensure_active(&site)?;

    if let Some(change) = state.site_context.select(user.id, id).await {
        tracing::info!(user_id = user.id, previous = ?change.previous, current = id, "Site selected");
    }
    Ok(Json(current_site_response(&state, user.id).await?))
}

// ---------------------------------------------------------------------------
// Per-site login
// ---------------------------------------------------------------------------

/// POST /api/sites/{id}/login
///
/// Check the credentials against the site, then keep them as the caller's
/// first-tier credential for that site.
pub async fn site_login(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<SiteLoginRequest>,
) -> AppResult<Json<SiteLoginResponse>> {
    let site = find_site(&state, id).await?;
    ensure_active(&site)?;
    let credential = Credential::basic(Some(input.username.as_str()), Some(input.password.as_str()))
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "Username and password are required".into(),
            ))
        })?;

    let check = state
        .clients
        .detached(&rest_root(&site.url), Some(credential.header_value()));
    match check.current_user().await {
        Ok(_) => {}
        Err(WpError::Api { status: 401 | 403, .. }) => {
            tracing::info!(user_id = user.id, site_id = id, "Site rejected login");
            return Err(AppError::Core(CoreError::Validation(
                "Site rejected the credentials".into(),
            )));
        }
        Err(e) => return Err(e.into()),
    }

    let login = state
        .site_logins
        .insert(user.id, id, credential, chrono::Utc::now())
        .await;

    tracing::info!(user_id = user.id, site_id = id, expires_at = %login.expires_at, "Site login stored");
    Ok(Json(SiteLoginResponse {
        site_id: id,
        expires_at: login.expires_at,
    }))
}

/// DELETE /api/sites/{id}/login
pub async fn site_logout(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> StatusCode {
    state.site_logins.remove(user.id, id).await;
    StatusCode::NO_CONTENT
}
