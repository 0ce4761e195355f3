//! Per-user cache of site clients.
//!
//! A cached client is only handed out while the requested site id, REST root
//! and `Authorization` value all match the ones it was built with; any
//! difference rebuilds it. Site-changed events evict eagerly.

use std::collections::HashMap;
use std::sync::Arc;

use sitecrm_core::site_context::SiteChanged;
use sitecrm_core::types::DbId;
use tokio::sync::{broadcast, RwLock};

use crate::client::WpClient;

/// What a cached client was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ClientKey {
    site_id: Option<DbId>,
    rest_root: String,
    auth_header: Option<String>,
}

struct CachedClient {
    key: ClientKey,
    client: Arc<WpClient>,
}

/// Shared per-user site client registry.
pub struct ClientRegistry {
    http: reqwest::Client,
    clients: RwLock<HashMap<DbId, CachedClient>>,
}

impl ClientRegistry {
    /// Create an empty registry whose clients share `http`'s connection pool.
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// An uncached client sharing the registry's connection pool.
    pub fn detached(&self, rest_root: &str, auth_header: Option<String>) -> WpClient {
        WpClient::for_site(self.http.clone(), rest_root, auth_header)
    }

    /// Return the user's client for the given site, building a fresh one when
    /// nothing is cached or the cached one was built for different inputs.
    pub async fn client_for(
        &self,
        user_id: DbId,
        site_id: Option<DbId>,
        rest_root: &str,
        auth_header: Option<String>,
    ) -> Arc<WpClient> {
        let key = ClientKey {
            site_id,
            rest_root: rest_root.to_string(),
            auth_header,
        };

        if let Some(cached) = self.clients.read().await.get(&user_id) {
            if cached.key == key {
                return Arc::clone(&cached.client);
            }
        }

        let client = Arc::new(WpClient::for_site(
            self.http.clone(),
            key.rest_root.clone(),
            key.auth_header.clone(),
        ));
        tracing::debug!(user_id, ?site_id, rest_root, "Built site client");

        self.clients.write().await.insert(
            user_id,
            CachedClient {
                key,
                client: Arc::clone(&client),
            },
        );
        client
    }

    /// Drop the user's cached client. Returns `true` if one was cached.
    pub async fn evict(&self, user_id: DbId) -> bool {
        self.clients.write().await.remove(&user_id).is_some()
    }

    /// Number of cached clients.
    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Evict on every site-changed event until the channel closes.
    pub async fn run_evictions(self: Arc<Self>, mut events: broadcast::Receiver<SiteChanged>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if self.evict(event.user_id).await {
                        tracing::debug!(
                            user_id = event.user_id,
                            previous = ?event.previous,
                            current = ?event.current,
                            "Evicted site client after site change",
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Lost events may hide stale entries; start over.
                    tracing::warn!(skipped, "Site-change events lagged, clearing client cache");
                    self.clients.write().await.clear();
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use sitecrm_core::site_context::SiteContext;

    use super::*;

    fn registry() -> ClientRegistry {
        ClientRegistry::new(reqwest::Client::new())
    }

    #[tokio::test]
    async fn same_inputs_reuse_the_client() {
        let reg = registry();
        let a = reg.client_for(1, Some(10), "https://a.test/wp-json", None).await;
        let b = reg.client_for(1, Some(10), "https://a.test/wp-json", None).await;
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn different_site_rebuilds() {
        let reg = registry();
        let a = reg.client_for(1, Some(10), "https://a.test/wp-json", None).await;
        let b = reg.client_for(1, Some(11), "https://b.test/wp-json", None).await;
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.rest_root(), "https://b.test/wp-json");
        assert_eq!(reg.len().await, 1);
    }

    #[tokio::test]
    async fn changed_credential_rebuilds() {
        let reg = registry();
        let a = reg
            .client_for(1, Some(10), "https://a.test/wp-json", Some("Bearer x".into()))
            .await;
        let b = reg
            .client_for(1, Some(10), "https://a.test/wp-json", Some("Bearer y".into()))
            .await;
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.auth_header(), Some("Bearer y"));
    }

    #[tokio::test]
    async fn users_have_separate_clients() {
        let reg = registry();
        reg.client_for(1, Some(10), "https://a.test/wp-json", None).await;
        reg.client_for(2, Some(10), "https://a.test/wp-json", None).await;
        assert_eq!(reg.len().await, 2);
    }

    #[tokio::test]
    async fn site_change_event_evicts() {
        let ctx = SiteContext::new();
        let reg = Arc::new(registry());
        let task = tokio::spawn(Arc::clone(&reg).run_evictions(ctx.subscribe()));

        reg.client_for(1, Some(10), "https://a.test/wp-json", None).await;
        reg.client_for(2, Some(10), "https://a.test/wp-json", None).await;
        ctx.select(1, 11).await;
        drop(ctx);
        task.await.unwrap();

        assert_eq!(reg.len().await, 1);
        assert!(!reg.evict(1).await);
        assert!(reg.evict(2).await);
    }
}
