//! Domain logic for the SiteCRM backend: roles, row-level filtering, site URL
//! handling, credential resolution and per-user site selection.
//!
//! Nothing here touches the database or the network.

pub mod credentials;
pub mod error;
pub mod filter;
pub mod permissions;
pub mod roles;
pub mod site_context;
pub mod site_url;
pub mod types;
