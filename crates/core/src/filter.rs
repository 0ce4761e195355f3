//! Row-level visibility for team-member roles.
//!
//! Team members (see [`Role::is_team_member`]) only see CRM items whose
//! `assigned_to` equals their profile id, or whose `author` does after string
//! coercion. Authors arrive from WordPress as numbers, so `42` matches the
//! profile id `"42"`. `assigned_to` gets no coercion.

use serde_json::Value;

use crate::roles::Role;
use crate::types::DbId;

/// The authenticated user as seen by the data filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub role: Role,
}

impl Profile {
    pub fn new(id: DbId, role: Role) -> Self {
        Self {
            id: id.to_string(),
            role,
        }
    }
}

/// An item carrying ownership fields.
pub trait Assignable {
    /// The id of the user the item is assigned to, compared verbatim.
    fn assigned_to(&self) -> Option<&str>;

    /// The author id, already coerced to a string.
    fn author(&self) -> Option<String>;
}

impl Assignable for Value {
    fn assigned_to(&self) -> Option<&str> {
        self.get("assigned_to").and_then(Value::as_str)
    }

    fn author(&self) -> Option<String> {
        match self.get("author")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Whether `item` is visible to `profile`.
pub fn is_visible_to<T: Assignable>(item: &T, profile: Option<&Profile>) -> bool {
    match profile {
        Some(profile) if profile.role.is_team_member() => is_owned_by(item, &profile.id),
        _ => true,
    }
}

/// Restrict `items` to those visible to `profile`, preserving order.
///
/// Without a profile, or for a role that is not a team member, the input
/// vector is handed back untouched.
pub fn filter_by_assignment<T: Assignable>(items: Vec<T>, profile: Option<&Profile>) -> Vec<T> {
    let Some(profile) = profile else {
        return items;
    };
    if !profile.role.is_team_member() {
        return items;
    }

    items
        .into_iter()
        .filter(|item| is_owned_by(item, &profile.id))
        .collect()
}

fn is_owned_by<T: Assignable>(item: &T, profile_id: &str) -> bool {
    item.assigned_to() == Some(profile_id) || item.author().as_deref() == Some(profile_id)
}
