//! Authentication primitives.
//!
//! - [`bootstrap`] -- first-run admin account from the environment.
//! - [`jwt`] -- identity token signing, validation and hashing.
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`session`] -- the session store consulted on every authenticated request.
//! - [`site_login`] -- in-memory per-site login credentials.

pub mod bootstrap;
pub mod jwt;
pub mod password;
pub mod session;
pub mod site_login;
