//! Route definitions for the `/sites` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sites;
use crate::state::AppState;

/// Routes mounted at `/sites`.
///
/// ```text
/// GET    /              -> list_sites
/// POST   /              -> create_site (sites.manage)
/// GET    /current       -> current
/// GET    /{id}          -> get_site
/// PUT    /{id}          -> update_site (sites.manage)
/// DELETE /{id}          -> delete_site (sites.manage)
/// POST   /{id}/select   -> select_site
/// POST   /{id}/login    -> site_login
/// DELETE /{id}/login    -> site_logout
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sites::list_sites).post(sites::create_site))
        .route("/current", get(sites::current))
        .route(
            "/{id}",
            get(sites::get_site)
                .put(sites::update_site)
                .delete(sites::delete_site),
        )
        .route("/{id}/select", post(sites::select_site))
        .route(
            "/{id}/login",
            post(sites::site_login).delete(sites::site_logout),
        )
}
