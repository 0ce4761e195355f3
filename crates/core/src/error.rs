use crate::types::DbId;

/// Domain-level errors shared by every crate in the workspace.
///
/// HTTP mapping lives in the api crate; this type carries no transport detail.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing, malformed, invalid or expired bearer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The token decodes but its session has been revoked.
    #[error("Session has been invalidated")]
    SessionInvalidated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Neither a current site nor a legacy site URL is configured.
    #[error("No site configured")]
    NoSiteConfigured,

    /// No credential tier produced a value for the site.
    #[error("No credentials available for site {site_id:?}")]
    CredentialUnavailable { site_id: Option<DbId> },

    #[error("Internal error: {0}")]
    Internal(String),
}
