//! REST client for one site's CRM namespace.
//!
//! A [`WpClient`] is bound to a REST root (e.g. `https://crm.example.com/wp-json`)
//! and an optional `Authorization` header value for its whole lifetime. A
//! different site or credential means a different client.

use std::fmt;

use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Namespace of the CRM plugin's routes below the REST root.
pub const CRM_NAMESPACE: &str = "crm/v1";

/// Errors from the site REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum WpError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The site returned a non-2xx status code.
    #[error("Site API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// HTTP client for a single site.
#[derive(Clone)]
pub struct WpClient {
    http: reqwest::Client,
    rest_root: String,
    auth_header: Option<String>,
}

impl WpClient {
    /// Build a client for `rest_root`, reusing `http` for connection pooling.
    ///
    /// With `auth_header` set every request carries it as `Authorization`;
    /// without it requests go out unauthenticated.
    pub fn for_site(
        http: reqwest::Client,
        rest_root: impl Into<String>,
        auth_header: Option<String>,
    ) -> Self {
        Self {
            http,
            rest_root: rest_root.into(),
            auth_header,
        }
    }

    pub fn rest_root(&self) -> &str {
        &self.rest_root
    }

    pub fn auth_header(&self) -> Option<&str> {
        self.auth_header.as_deref()
    }

    /// `GET /crm/v1/leads`, forwarding `query` verbatim.
    pub async fn list_leads(&self, query: &[(String, String)]) -> Result<Vec<Value>, WpError> {
        let response = self
            .request(Method::GET, "leads")
            .query(query)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `GET /crm/v1/leads/{id}`.
    pub async fn get_lead(&self, id: u64) -> Result<Value, WpError> {
        let response = self
            .request(Method::GET, &format!("leads/{id}"))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `POST /crm/v1/leads`.
    pub async fn create_lead(&self, body: &Value) -> Result<Value, WpError> {
        let response = self
            .request(Method::POST, "leads")
            .json(body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `PUT /crm/v1/leads/{id}`.
    pub async fn update_lead(&self, id: u64, body: &Value) -> Result<Value, WpError> {
        let response = self
            .request(Method::PUT, &format!("leads/{id}"))
            .json(body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `DELETE /crm/v1/leads/{id}`.
    pub async fn delete_lead(&self, id: u64) -> Result<(), WpError> {
        let response = self
            .request(Method::DELETE, &format!("leads/{id}"))
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// `GET /wp/v2/users/me`: the account the configured credential maps to.
    ///
    /// Used to check a credential before it is stored.
    pub async fn current_user(&self) -> Result<Value, WpError> {
        let url = format!("{}/wp/v2/users/me", self.rest_root);
        let response = self.with_auth(self.http.get(url)).send().await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{CRM_NAMESPACE}/{}",
            self.rest_root,
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = self.url(path);
        tracing::debug!(%method, %url, authenticated = self.auth_header.is_some(), "Site API request");

        self.with_auth(self.http.request(method, url))
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_header {
            Some(value) => builder.header(AUTHORIZATION, value),
            None => builder,
        }
    }

    /// Ensure the response has a success status code, or turn it into
    /// [`WpError::Api`] carrying the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, WpError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(WpError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, WpError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn check_status(response: reqwest::Response) -> Result<(), WpError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

impl fmt::Debug for WpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WpClient")
            .field("rest_root", &self.rest_root)
            .field("authenticated", &self.auth_header.is_some())
            .finish()
    }
}
