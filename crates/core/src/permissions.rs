//! Permission names.
//!
//! Seeded (and granted to the built-in roles) by
//! `20261001000002_create_roles_and_permissions.sql`; the API checks them by
//! name against the caller's role grants.

/// List and read CRM leads.
pub const LEADS_READ: &str = "leads.read";
/// Create, update and delete CRM leads.
pub const LEADS_WRITE: &str = "leads.write";
/// Create, update and delete sites.
pub const SITES_MANAGE: &str = "sites.manage";
/// Manage roles, permissions and role grants.
pub const ROLES_MANAGE: &str = "roles.manage";
/// Create users and invalidate their sessions.
pub const USERS_MANAGE: &str = "users.manage";

/// Every permission the API checks.
pub const ALL: [&str; 5] = [
    LEADS_READ,
    LEADS_WRITE,
    SITES_MANAGE,
    ROLES_MANAGE,
    USERS_MANAGE,
];
