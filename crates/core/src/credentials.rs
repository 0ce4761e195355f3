//! Site credential resolution.
//!
//! Outbound requests to a site's REST API carry an `Authorization` value
//! chosen from three tiers, tried in order:
//!
//! 1. [`SiteLoginProvider`] -- the current user's unexpired per-site login.
//! 2. [`StoredSiteProvider`] -- credentials stored on the site record.
//! 3. [`GlobalProvider`] -- the globally configured fallback.
//!
//! The first provider returning a credential wins. When none does the caller
//! sends the request unauthenticated.

use std::collections::HashMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::types::{DbId, Timestamp};

/// A credential for a site's REST API.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// WordPress user + application password, sent as HTTP Basic.
    Basic { username: String, password: String },
    /// An API key, sent as a bearer token.
    Bearer(String),
}

impl Credential {
    /// Build a Basic credential when both parts are present and non-blank.
    pub fn basic(username: Option<&str>, password: Option<&str>) -> Option<Self> {
        let username = username.map(str::trim).filter(|s| !s.is_empty())?;
        let password = password.filter(|s| !s.trim().is_empty())?;
        Some(Credential::Basic {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Build a Bearer credential from a non-blank key.
    pub fn bearer(key: Option<&str>) -> Option<Self> {
        let key = key.map(str::trim).filter(|s| !s.is_empty())?;
        Some(Credential::Bearer(key.to_string()))
    }

    /// The value of the `Authorization` header for this credential.
    pub fn header_value(&self) -> String {
        match self {
            Credential::Basic { username, password } => {
                format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
            }
            Credential::Bearer(key) => format!("Bearer {key}"),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credential::Bearer(_) => f.write_str("Bearer(<redacted>)"),
        }
    }
}

/// Which tier a resolved credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialTier {
    SiteLogin,
    SiteStored,
    Global,
}

impl CredentialTier {
    pub fn as_str(self) -> &'static str {
        match self {
            CredentialTier::SiteLogin => "site_login",
            CredentialTier::SiteStored => "site_stored",
            CredentialTier::Global => "global",
        }
    }
}

/// The outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    pub tier: CredentialTier,
    /// Ready-to-send `Authorization` header value.
    pub header: String,
}

/// One credential tier.
pub trait CredentialProvider {
    fn tier(&self) -> CredentialTier;

    /// The credential this tier offers for `site_id`, if any.
    fn provide(&self, site_id: Option<DbId>) -> Option<Credential>;
}

/// Try `providers` in order; the first credential found wins.
pub fn resolve_credential(
    site_id: Option<DbId>,
    providers: &[&dyn CredentialProvider],
) -> Option<ResolvedCredential> {
    providers.iter().find_map(|provider| {
        provider
            .provide(site_id)
            .map(|credential| ResolvedCredential {
                tier: provider.tier(),
                header: credential.header_value(),
            })
    })
}

// ---------------------------------------------------------------------------
// Tier 1: per-site login
// ---------------------------------------------------------------------------

/// A credential the user established by logging in to one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLogin {
    pub credential: Credential,
    pub expires_at: Timestamp,
}

impl SiteLogin {
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        self.expires_at > now
    }
}

/// Offers the user's unexpired login for the requested site.
pub struct SiteLoginProvider<'a> {
    /// The user's logins keyed by site id.
    pub logins: &'a HashMap<DbId, SiteLogin>,
    pub now: Timestamp,
}

impl CredentialProvider for SiteLoginProvider<'_> {
    fn tier(&self) -> CredentialTier {
        CredentialTier::SiteLogin
    }

    fn provide(&self, site_id: Option<DbId>) -> Option<Credential> {
        let login = self.logins.get(&site_id?)?;
        login
            .is_valid_at(self.now)
            .then(|| login.credential.clone())
    }
}

// ---------------------------------------------------------------------------
// Tier 2: credentials stored on the site record
// ---------------------------------------------------------------------------

/// Offers the credential stored on a site record, only for that site's id.
pub struct StoredSiteProvider<'a> {
    /// Id of the site record the credential belongs to; `None` without a site.
    pub site_id: Option<DbId>,
    pub credential: Option<&'a Credential>,
}

impl CredentialProvider for StoredSiteProvider<'_> {
    fn tier(&self) -> CredentialTier {
        CredentialTier::SiteStored
    }

    fn provide(&self, site_id: Option<DbId>) -> Option<Credential> {
        let requested = site_id?;
        if self.site_id != Some(requested) {
            return None;
        }
        self.credential.cloned()
    }
}

// ---------------------------------------------------------------------------
// Tier 3: global fallback
// ---------------------------------------------------------------------------

/// Offers the globally configured credential for any site, including none.
pub struct GlobalProvider<'a> {
    pub credential: Option<&'a Credential>,
}

impl CredentialProvider for GlobalProvider<'_> {
    fn tier(&self) -> CredentialTier {
        CredentialTier::Global
    }

    fn provide(&self, _site_id: Option<DbId>) -> Option<Credential> {
        self.credential.cloned()
    }
}
