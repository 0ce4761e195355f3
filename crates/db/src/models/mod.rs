//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the table row
//! plus the create/update DTOs its repository accepts.

pub mod permission;
pub mod role;
pub mod session;
pub mod site;
pub mod user;
