//! Route definitions for the `/roles` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::roles;
use crate::state::AppState;

/// Routes mounted at `/roles`.
///
/// ```text
/// GET    /                   -> list_roles
/// POST   /                   -> create_role (roles.manage)
/// GET    /{id}               -> get_role
/// PUT    /{id}               -> update_role (roles.manage)
/// DELETE /{id}               -> delete_role (roles.manage)
/// GET    /{id}/permissions   -> get_role_permissions
/// PUT    /{id}/permissions   -> set_role_permissions (roles.manage)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(roles::list_roles).post(roles::create_role))
        .route(
            "/{id}",
            get(roles::get_role)
                .put(roles::update_role)
                .delete(roles::delete_role),
        )
        .route(
            "/{id}/permissions",
            get(roles::get_role_permissions).put(roles::set_role_permissions),
        )
}
