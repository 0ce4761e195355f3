use sitecrm_core::credentials::Credential;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Lifetime of per-site logins in minutes (default: `480`).
    pub site_login_ttl_mins: i64,
    /// Identity token configuration.
    pub jwt: JwtConfig,
    /// Site fallbacks used when no site is selected or a site has no credentials.
    pub wp: WpConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SITE_LOGIN_TTL_MINS`  | `480`                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let site_login_ttl_mins = parse_site_login_ttl(
            &std::env::var("SITE_LOGIN_TTL_MINS").unwrap_or_else(|_| "480".into()),
        );

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            site_login_ttl_mins,
            jwt: JwtConfig::from_env(),
            wp: WpConfig::from_env(),
        }
    }
}

/// Parse `SITE_LOGIN_TTL_MINS`. A non-positive TTL would expire every site
/// login on arrival, so it is rejected like any other invalid value.
fn parse_site_login_ttl(raw: &str) -> i64 {
    let mins: i64 = raw
        .trim()
        .parse()
        .expect("SITE_LOGIN_TTL_MINS must be a valid i64");
    assert!(mins > 0, "SITE_LOGIN_TTL_MINS must be positive");
    mins
}

/// First-run admin account, read from `ADMIN_USERNAME` / `ADMIN_PASSWORD`
/// (and optionally `ADMIN_EMAIL`).
///
/// Only consulted at startup, and only acted on while the `users` table is
/// empty. See [`crate::auth::bootstrap::ensure_admin`].
#[derive(Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl AdminBootstrap {
    /// `None` unless both username and password are set and non-blank.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let username = var("ADMIN_USERNAME")?.trim().to_string();
        let password = var("ADMIN_PASSWORD")?;
        let email = var("ADMIN_EMAIL").unwrap_or_else(|| format!("{username}@localhost"));

        Some(Self {
            username,
            email,
            password,
        })
    }
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Global site fallbacks.
#[derive(Debug, Clone, Default)]
pub struct WpConfig {
    /// Site URL used when the user has no current site.
    pub legacy_url: Option<String>,
    /// Credential used when neither a site login nor stored site credentials exist.
    pub global_credential: Option<Credential>,
}

impl WpConfig {
    /// | Env Var           | Meaning                                      |
    /// |-------------------|----------------------------------------------|
    /// | `WP_URL`          | legacy site URL                              |
    /// | `WP_USERNAME`     | global Basic credential user                 |
    /// | `WP_APP_PASSWORD` | global Basic credential application password |
    /// | `WP_API_KEY`      | global Bearer key, used when Basic is unset  |
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let legacy_url = var("WP_URL");
        let global_credential = Credential::basic(
            var("WP_USERNAME").as_deref(),
            var("WP_APP_PASSWORD").as_deref(),
        )
        .or_else(|| Credential::bearer(var("WP_API_KEY").as_deref()));

        Self {
            legacy_url,
            global_credential,
        }
    }
}
