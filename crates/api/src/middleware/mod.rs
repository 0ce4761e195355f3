//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- identity from a valid bearer token with an active session.
//! - [`rbac::AuthProfile`] -- [`auth::AuthUser`] plus the user's role.
//! - [`rbac::require_permission`] -- rejects callers whose role lacks a permission.

pub mod auth;
pub mod rbac;
