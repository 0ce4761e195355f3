pub mod auth;
pub mod health;
pub mod leads;
pub mod permissions;
pub mod roles;
pub mod sites;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                                  service health (public)
///
/// /auth/login                              login (public)
/// /auth/logout                             logout (auth)
/// /auth/verify                             token check (auth)
/// /auth/me                                 profile + permissions (auth)
/// /auth/register                           create user (users.manage)
/// /auth/users/{id}/invalidate-sessions     force sessions inactive (users.manage)
///
/// /roles                                   list (auth), create (roles.manage)
/// /roles/{id}                              get (auth), update, delete (roles.manage)
/// /roles/{id}/permissions                  get (auth), replace (roles.manage)
///
/// /permissions                             list (auth), create (roles.manage)
/// /permissions/me                          caller's permission names (auth)
/// /permissions/{id}                        delete (roles.manage)
///
/// /sites                                   list (auth), create (sites.manage)
/// /sites/current                           caller's current site (auth)
/// /sites/{id}                              get (auth), update, delete (sites.manage)
/// /sites/{id}/select                       make current (auth)
/// /sites/{id}/login                        store, drop site login (auth)
///
/// /crm/leads                               list (leads.read), create (leads.write)
/// /crm/leads/{id}                          get (leads.read), update, delete (leads.write)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/auth", auth::router())
        .nest("/roles", roles::router())
        .nest("/permissions", permissions::router())
        .nest("/sites", sites::router())
        .nest("/crm/leads", leads::router())
}
