//! Role names and the capability predicates derived from them.
//!
//! The well-known names must match the seed data in
//! `20261001000002_create_roles_and_permissions.sql`. Roles created at runtime
//! through the roles API parse as [`Role::Custom`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_SALES_PERSON: &str = "sales_person";
pub const ROLE_SEO_PERSON: &str = "seo_person";
pub const ROLE_CLIENT: &str = "client";

/// A user's role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Role {
    Admin,
    Manager,
    SalesPerson,
    SeoPerson,
    Client,
    Custom(String),
}

impl Role {
    /// Team members only see CRM rows assigned to or authored by themselves.
    pub fn is_team_member(&self) -> bool {
        matches!(self, Role::SalesPerson | Role::SeoPerson | Role::Client)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Manager => ROLE_MANAGER,
            Role::SalesPerson => ROLE_SALES_PERSON,
            Role::SeoPerson => ROLE_SEO_PERSON,
            Role::Client => ROLE_CLIENT,
            Role::Custom(name) => name,
        }
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            ROLE_ADMIN => Role::Admin,
            ROLE_MANAGER => Role::Manager,
            ROLE_SALES_PERSON => Role::SalesPerson,
            ROLE_SEO_PERSON => Role::SeoPerson,
            ROLE_CLIENT => Role::Client,
            other => Role::Custom(other.to_string()),
        })
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(role) => role,
            Err(never) => match never {},
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
