//! Handlers for the CRM `/crm/leads` proxy.
//!
//! Every call goes to the caller's current site (or the legacy URL) through
//! the cached client for that site. The site is resolved before the role so a
//! missing site is reported as such regardless of who asks.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;
use sitecrm_core::error::CoreError;
use sitecrm_core::filter::{filter_by_assignment, is_visible_to};
use sitecrm_core::permissions::{LEADS_READ, LEADS_WRITE};
use sitecrm_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{require_permission, AuthProfile};
use crate::response::DataResponse;
use crate::site_client::{site_target, SiteTarget};
use crate::state::AppState;

/// Resolve the target for a write: a credential must exist and the caller's
/// role must grant [`LEADS_WRITE`].
async fn write_target(state: &AppState, user: &AuthUser) -> AppResult<SiteTarget> {
    let target = site_target(state, user.id).await?;
    target.require_credential()?;
    require_permission(&state.pool, user.id, LEADS_WRITE).await?;
    Ok(target)
}

/// Lead ids on the site are unsigned; anything else cannot exist there.
fn parse_lead_id(id: DbId) -> AppResult<u64> {
    u64::try_from(id).map_err(|_| AppError::Core(CoreError::NotFound { entity: "Lead", id }))
}

fn require_object(body: &Value) -> AppResult<()> {
    if !body.is_object() {
        return Err(AppError::BadRequest("Lead payload must be a JSON object".into()));
    }
    Ok(())
}

/// GET /api/crm/leads
///
/// Requires `leads.read`. Query parameters are forwarded verbatim. Team
/// members only see leads assigned to them.
pub async fn list_leads(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<Vec<(String, String)>>,
) -> AppResult<Json<DataResponse<Vec<Value>>>> {
    let target = site_target(&state, user.id).await?;
    require_permission(&state.pool, user.id, LEADS_READ).await?;
    let profile = AuthProfile::load(&state.pool, user).await?;

    let leads = target.client.list_leads(&query).await?;
    let total = leads.len();
    let visible = filter_by_assignment(leads, Some(&profile.profile()));

    tracing::debug!(
        user_id = profile.user.id,
        role = %profile.role,
        total,
        visible = visible.len(),
        "Listed leads",
    );
    Ok(Json(DataResponse { data: visible }))
}

/// GET /api/crm/leads/{id}
///
/// Requires `leads.read`. A lead the caller may not see is reported as
/// missing.
pub async fn get_lead(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Value>>> {
    let lead_id = parse_lead_id(id)?;
    let target = site_target(&state, user.id).await?;
    require_permission(&state.pool, user.id, LEADS_READ).await?;
    let profile = AuthProfile::load(&state.pool, user).await?;

    let lead = target.client.get_lead(lead_id).await?;
    if !is_visible_to(&lead, Some(&profile.profile())) {
        return Err(AppError::Core(CoreError::NotFound { entity: "Lead", id }));
    }
    Ok(Json(DataResponse { data: lead }))
}

/// POST /api/crm/leads
pub async fn create_lead(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<Value>,
) -> AppResult<(StatusCode, Json<DataResponse<Value>>)> {
    require_object(&body)?;
    let target = write_target(&state, &user).await?;
    let lead = target.client.create_lead(&body).await?;

    tracing::info!(user_id = user.id, site = %target.rest_root, "Lead created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: lead })))
}

/// PUT /api/crm/leads/{id}
pub async fn update_lead(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(body): Json<Value>,
) -> AppResult<Json<DataResponse<Value>>> {
    require_object(&body)?;
    let lead_id = parse_lead_id(id)?;
    let target = write_target(&state, &user).await?;
    let lead = target.client.update_lead(lead_id, &body).await?;

    tracing::info!(user_id = user.id, lead_id = id, site = %target.rest_root, "Lead updated");
    Ok(Json(DataResponse { data: lead }))
}

/// DELETE /api/crm/leads/{id}
pub async fn delete_lead(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let lead_id = parse_lead_id(id)?;
    let target = write_target(&state, &user).await?;
    target.client.delete_lead(lead_id).await?;

    tracing::info!(user_id = user.id, lead_id = id, site = %target.rest_root, "Lead deleted");
    Ok(StatusCode::NO_CONTENT)
}
