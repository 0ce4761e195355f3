//! Per-user, per-site login credentials.
//!
//! Established by `POST /api/sites/{id}/login` and consulted as the first
//! credential tier. Held in memory only; they expire after the configured TTL
//! and are dropped on logout.

use std::collections::HashMap;

use sitecrm_core::credentials::{Credential, SiteLogin};
use sitecrm_core::types::{DbId, Timestamp};
use tokio::sync::RwLock;

/// All site logins, keyed by user id then site id.
pub struct SiteLogins {
    ttl: chrono::Duration,
    logins: RwLock<HashMap<DbId, HashMap<DbId, SiteLogin>>>,
}

impl SiteLogins {
    pub fn new(ttl: chrono::Duration) -> Self {
        Self {
            ttl,
            logins: RwLock::new(HashMap::new()),
        }
    }

    /// Store (or replace) the user's login for a site, expiring `ttl` after `now`.
    pub async fn insert(
        &self,
        user_id: DbId,
        site_id: DbId,
        credential: Credential,
        now: Timestamp,
    ) -> SiteLogin {
        let login = SiteLogin {
            credential,
            expires_at: now + self.ttl,
        };
        self.logins
            .write()
            .await
            .entry(user_id)
            .or_default()
            .insert(site_id, login.clone());
        login
    }

    /// Drop the user's login for one site. Returns `true` if one existed.
    pub async fn remove(&self, user_id: DbId, site_id: DbId) -> bool {
        let mut logins = self.logins.write().await;
        let Some(per_site) = logins.get_mut(&user_id) else {
            return false;
        };
        let removed = per_site.remove(&site_id).is_some();
        if per_site.is_empty() {
            logins.remove(&user_id);
        }
        removed
    }

    /// Copy of the user's logins keyed by site id, expired ones included.
    pub async fn snapshot(&self, user_id: DbId) -> HashMap<DbId, SiteLogin> {
        self.logins
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Drop every login of a user.
    pub async fn forget_user(&self, user_id: DbId) {
        self.logins.write().await.remove(&user_id);
    }

    /// Drop every login for a site (the site was deleted or re-pointed).
    pub async fn forget_site(&self, site_id: DbId) {
        let mut logins = self.logins.write().await;
        for per_site in logins.values_mut() {
            per_site.remove(&site_id);
        }
        logins.retain(|_, per_site| !per_site.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn cred(name: &str) -> Credential {
        Credential::Bearer(name.to_string())
    }

    #[tokio::test]
    async fn insert_sets_expiry_from_ttl() {
        let store = SiteLogins::new(Duration::minutes(30));
        let now = Utc::now();
        let login = store.insert(1, 10, cred("a"), now).await;
        assert_eq!(login.expires_at, now + Duration::minutes(30));
        assert!(login.is_valid_at(now));
        assert!(!login.is_valid_at(now + Duration::minutes(31)));
    }

    #[tokio::test]
    async fn snapshot_is_per_user() {
        let store = SiteLogins::new(Duration::minutes(30));
        let now = Utc::now();
        store.insert(1, 10, cred("a"), now).await;
        store.insert(2, 10, cred("b"), now).await;

        let snap = store.snapshot(1).await;
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[&10].credential, cred("a"));
        assert!(store.snapshot(3).await.is_empty());
    }

    #[tokio::test]
    async fn remove_and_forget() {
        let store = SiteLogins::new(Duration::minutes(30));
        let now = Utc::now();
        store.insert(1, 10, cred("a"), now).await;
        store.insert(1, 11, cred("b"), now).await;
        store.insert(2, 11, cred("c"), now).await;

        assert!(store.remove(1, 10).await);
        assert!(!store.remove(1, 10).await);

        store.forget_site(11).await;
        assert!(store.snapshot(1).await.is_empty());
        assert!(store.snapshot(2).await.is_empty());

        store.insert(3, 12, cred("d"), now).await;
        store.forget_user(3).await;
        assert!(store.snapshot(3).await.is_empty());
    }
}
