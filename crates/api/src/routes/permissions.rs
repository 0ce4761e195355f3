//! Route definitions for the `/permissions` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::permissions;
use crate::state::AppState;

/// Routes mounted at `/permissions`.
///
/// ```text
/// GET    /       -> list_permissions
/// POST   /       -> create_permission (roles.manage)
/// GET    /me     -> my_permissions
/// DELETE /{id}   -> delete_permission (roles.manage)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(permissions::list_permissions).post(permissions::create_permission),
        )
        .route("/me", get(permissions::my_permissions))
        .route("/{id}", delete(permissions::delete_permission))
}
