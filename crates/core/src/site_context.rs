//! Per-user "current site" state.
//!
//! Each user has at most one current site. Every change of the selected id is
//! returned to the caller as a [`SiteChanged`] event and also published on a
//! broadcast channel so holders of site-bound state (cached API clients) can
//! drop it.

use std::collections::HashMap;

use tokio::sync::{broadcast, RwLock};

use crate::types::DbId;

/// Broadcast buffer; slow subscribers lose the oldest events.
const EVENT_CAPACITY: usize = 256;

/// Emitted whenever a user's current site id changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteChanged {
    pub user_id: DbId,
    pub previous: Option<DbId>,
    pub current: Option<DbId>,
}

/// Current-site selections for all users.
pub struct SiteContext {
    selections: RwLock<HashMap<DbId, DbId>>,
    events: broadcast::Sender<SiteChanged>,
}

impl SiteContext {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            selections: RwLock::new(HashMap::new()),
            events,
        }
    }

    /// Subscribe to site-changed events.
    pub fn subscribe(&self) -> broadcast::Receiver<SiteChanged> {
        self.events.subscribe()
    }

    /// The user's current site id, if one is selected.
    pub async fn current(&self, user_id: DbId) -> Option<DbId> {
        self.selections.read().await.get(&user_id).copied()
    }

    /// Make `site_id` the user's current site.
    ///
    /// Returns `None` when it already was.
    pub async fn select(&self, user_id: DbId, site_id: DbId) -> Option<SiteChanged> {
        let previous = self.selections.write().await.insert(user_id, site_id);
        if previous == Some(site_id) {
            return None;
        }
        Some(self.publish(SiteChanged {
            user_id,
            previous,
            current: Some(site_id),
        }))
    }

    /// Clear the user's selection.
    pub async fn clear(&self, user_id: DbId) -> Option<SiteChanged> {
        let previous = self.selections.write().await.remove(&user_id)?;
        Some(self.publish(SiteChanged {
            user_id,
            previous: Some(previous),
            current: None,
        }))
    }

    /// Clear every selection pointing at `site_id` (the site was deleted).
    pub async fn forget_site(&self, site_id: DbId) -> Vec<SiteChanged> {
        let affected: Vec<DbId> = {
            let mut selections = self.selections.write().await;
            let users: Vec<DbId> = selections
                .iter()
                .filter(|(_, selected)| **selected == site_id)
                .map(|(user_id, _)| *user_id)
                .collect();
            for user_id in &users {
                selections.remove(user_id);
            }
            users
        };

        affected
            .into_iter()
            .map(|user_id| {
                self.publish(SiteChanged {
                    user_id,
                    previous: Some(site_id),
                    current: None,
                })
            })
            .collect()
    }

    fn publish(&self, event: SiteChanged) -> SiteChanged {
        // No subscribers is fine.
        let _ = self.events.send(event.clone());
        event
    }
}

impl Default for SiteContext {
    fn default() -> Self {
        Self::new()
    }
}
