use std::sync::Arc;

use sitecrm_core::site_context::SiteContext;
use sitecrm_wp::ClientRegistry;

use crate::auth::session::SessionStore;
use crate::auth::site_login::SiteLogins;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: sitecrm_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Session validity lookups for the auth extractor.
    pub sessions: Arc<dyn SessionStore>,
    /// Per-user current site.
    pub site_context: Arc<SiteContext>,
    /// Per-user, per-site login credentials.
    pub site_logins: Arc<SiteLogins>,
    /// Per-user site API clients.
    pub clients: Arc<ClientRegistry>,
}
