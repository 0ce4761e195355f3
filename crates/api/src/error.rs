use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sitecrm_core::error::CoreError;
use sitecrm_wp::WpError;
use sqlx::error::ErrorKind;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce `{ "error", "code" }` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `sitecrm_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A failed call to a site's REST API.
    #[error("Site API error: {0}")]
    Upstream(#[from] WpError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Shorthand for the common 401 case.
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Core(CoreError::Unauthorized(msg.into()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Site API errors ---
            AppError::Upstream(err) => classify_upstream_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::SessionInvalidated => (
            StatusCode::UNAUTHORIZED,
            "SESSION_INVALIDATED",
            "Session has been invalidated. Please log in again.".to_string(),
        ),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::NoSiteConfigured => (
            StatusCode::PRECONDITION_FAILED,
            "NO_SITE_CONFIGURED",
            "No site is configured. Select or add a site first.".to_string(),
        ),
        CoreError::CredentialUnavailable { .. } => (
            StatusCode::PRECONDITION_FAILED,
            "CREDENTIAL_UNAVAILABLE",
            "No credentials are available for the current site. Log in to the site first."
                .to_string(),
        ),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique and foreign-key violations map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => match db_err.kind() {
            ErrorKind::UniqueViolation => (
                StatusCode::CONFLICT,
                "CONFLICT",
                "Duplicate value violates a unique constraint".to_string(),
            ),
            ErrorKind::ForeignKeyViolation => (
                StatusCode::CONFLICT,
                "CONFLICT",
                "Resource is referenced by other records".to_string(),
            ),
            _ => {
                tracing::error!(error = %db_err, "Database error");
                internal()
            }
        },
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

/// Classify a site API failure.
///
/// A 404 from the site stays a 404; 400/422 are relayed as rejected input;
/// anything else is a bad gateway.
fn classify_upstream_error(err: &WpError) -> (StatusCode, &'static str, String) {
    match err {
        WpError::Api { status: 404, .. } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found on site".to_string(),
        ),
        WpError::Api {
            status: 400 | 422,
            body,
        } => (StatusCode::BAD_REQUEST, "UPSTREAM_REJECTED", body.clone()),
        WpError::Api { status, body } => {
            tracing::warn!(status, body = %body, "Site API returned an error");
            (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                format!("Site API returned status {status}"),
            )
        }
        WpError::Request(e) => {
            tracing::warn!(error = %e, "Site API unreachable");
            (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_UNREACHABLE",
                "Site API is unreachable".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn session_invalidated_has_distinct_code() {
        let (status, body) = render(CoreError::SessionInvalidated.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "SESSION_INVALIDATED");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn unauthorized_maps_to_401() {
        let (status, body) = render(AppError::unauthorized("Missing Authorization header")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
        assert_eq!(body["error"], "Missing Authorization header");
    }

    #[tokio::test]
    async fn no_site_configured_is_precondition_failed() {
        let (status, body) = render(CoreError::NoSiteConfigured.into()).await;
        assert_eq!(status, StatusCode::PRECONDITION_FAILED);
        assert_eq!(body["code"], "NO_SITE_CONFIGURED");
    }

    #[tokio::test]
    async fn upstream_404_stays_404() {
        let err = WpError::Api {
            status: 404,
            body: "{}".into(),
        };
        let (status, _) = render(err.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn upstream_500_is_bad_gateway() {
        let err = WpError::Api {
            status: 500,
            body: "boom".into(),
        };
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "UPSTREAM_ERROR");
    }

    #[tokio::test]
    async fn internal_messages_are_sanitized() {
        let (status, body) = render(AppError::InternalError("secret detail".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An internal error occurred");
    }
}
