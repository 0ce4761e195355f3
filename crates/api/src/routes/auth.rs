//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /login                           -> login
/// POST /logout                          -> logout (requires auth)
/// GET  /verify                          -> verify (requires auth)
/// GET  /me                              -> me (requires auth)
/// POST /register                        -> register (users.manage)
/// POST /users/{id}/invalidate-sessions  -> invalidate_sessions (users.manage)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/verify", get(auth::verify))
        .route("/me", get(auth::me))
        .route("/register", post(auth::register))
        .route(
            "/users/{id}/invalidate-sessions",
            post(auth::invalidate_sessions),
        )
}
