//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&MySqlPool` as the first argument. MySQL has no `RETURNING`, so inserts
//! re-read the row by `LAST_INSERT_ID()`.

pub mod permission_repo;
pub mod role_repo;
pub mod session_repo;
pub mod site_repo;
pub mod user_repo;

pub use permission_repo::PermissionRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use site_repo::SiteRepo;
pub use user_repo::UserRepo;
