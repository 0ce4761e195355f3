//! Site-aware client selection for CRM requests.
//!
//! Resolves, for one user: the current site record, its REST root (falling
//! back to the legacy configured URL), the credential tier to use, and the
//! client bound to that combination.

use std::sync::Arc;

use sitecrm_core::credentials::{
    resolve_credential, GlobalProvider, ResolvedCredential, SiteLoginProvider, StoredSiteProvider,
};
use sitecrm_core::error::CoreError;
use sitecrm_core::site_url::require_rest_url;
use sitecrm_core::types::DbId;
use sitecrm_db::models::site::Site;
use sitecrm_db::repositories::SiteRepo;
use sitecrm_wp::WpClient;

use crate::error::AppResult;
use crate::state::AppState;

/// Everything needed to talk to the user's current site.
pub struct SiteTarget {
    pub site: Option<Site>,
    pub rest_root: String,
    pub credential: Option<ResolvedCredential>,
    pub client: Arc<WpClient>,
}

/// The user's current site, if one is selected, still exists and is active.
///
/// A selection pointing at a deleted site is cleared.
pub async fn current_site(state: &AppState, user_id: DbId) -> AppResult<Option<Site>> {
    let Some(site_id) = state.site_context.current(user_id).await else {
        return Ok(None);
    };

    match SiteRepo::find_by_id(&state.pool, site_id).await? {
        Some(site) if site.is_active => Ok(Some(site)),
        Some(_) => Ok(None),
        None => {
            tracing::info!(user_id, site_id, "Selected site no longer exists, clearing selection");
            state.site_context.clear(user_id).await;
            Ok(None)
        }
    }
}

/// Resolve the `Authorization` value for `site` on behalf of `user_id`.
///
/// Tiers: the user's site login, the site's stored credentials, the global
/// fallback. `None` means the request goes out unauthenticated.
pub async fn resolve_site_credential(
    state: &AppState,
    user_id: DbId,
    site: Option<&Site>,
) -> Option<ResolvedCredential> {
    let logins = state.site_logins.snapshot(user_id).await;
    let stored = site.and_then(Site::stored_credential);
    let site_id = site.map(|s| s.id);

    let resolved = resolve_credential(
        site_id,
        &[
            &SiteLoginProvider {
                logins: &logins,
                now: chrono::Utc::now(),
            },
            &StoredSiteProvider {
                site_id,
                credential: stored.as_ref(),
            },
            &GlobalProvider {
                credential: state.config.wp.global_credential.as_ref(),
            },
        ],
    );

    match &resolved {
        Some(credential) => {
            tracing::debug!(user_id, ?site_id, tier = credential.tier.as_str(), "Resolved site credential");
        }
        None => {
            tracing::debug!(
                user_id,
                error = %CoreError::CredentialUnavailable { site_id },
                "Sending site request unauthenticated",
            );
        }
    }
    resolved
}

/// Resolve the current site and hand out the client bound to it.
///
/// Fails with [`CoreError::NoSiteConfigured`] when neither a current site nor
/// a legacy URL exists.
pub async fn site_target(state: &AppState, user_id: DbId) -> AppResult<SiteTarget> {
    let site = current_site(state, user_id).await?;
    let rest_root = require_rest_url(
        site.as_ref().map(|s| s.url.as_str()),
        state.config.wp.legacy_url.as_deref(),
    )?;

    let credential = resolve_site_credential(state, user_id, site.as_ref()).await;
    let client = state
        .clients
        .client_for(
            user_id,
            site.as_ref().map(|s| s.id),
            &rest_root,
            credential.as_ref().map(|c| c.header.clone()),
        )
        .await;

    Ok(SiteTarget {
        site,
        rest_root,
        credential,
        client,
    })
}

impl SiteTarget {
    /// Writes need some credential; an anonymous write would be refused by
    /// the site anyway.
    pub fn require_credential(&self) -> Result<(), CoreError> {
        if self.credential.is_none() {
            return Err(CoreError::CredentialUnavailable {
                site_id: self.site.as_ref().map(|s| s.id),
            });
        }
        Ok(())
    }
}
