//! Client for the CRM REST namespace a WordPress site exposes under
//! `/wp-json/crm/v1`.
//!
//! - [`client`] -- a client bound to one site's REST root and credential.
//! - [`registry`] -- per-user client cache keyed by the current site.

pub mod client;
pub mod registry;

pub use client::{WpClient, WpError};
pub use registry::ClientRegistry;
