//! Change notifications from the remote store.
//!
//! The store's realtime feed is used purely as an invalidation signal:
//! a notification says *something* in a collection changed and the
//! consumer should re-fetch. It never carries the changed rows.

use tokio::sync::broadcast;
use tracing::trace;

/// Remote collections that emit change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// The projects table.
    Projects,
    /// The per-project status timeline table.
    ProjectTimeline,
    /// The client reference-name table.
    Clients,
    /// The editor reference-name table.
    Editors,
}

impl Collection {
    /// Remote table name.
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Projects => "projects",
            Collection::ProjectTimeline => "project_timeline",
            Collection::Clients => "clients",
            Collection::Editors => "editors",
        }
    }
}

/// An invalidation signal: a row in `collection` was inserted, updated,
/// or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Which collection changed.
    pub collection: Collection,
}

/// Fan-out point for change notifications.
///
/// Subscribers hold a `broadcast::Receiver`; dropping it unsubscribes.
/// Because events are invalidation-only, a subscriber that lags and
/// misses events loses nothing a single re-fetch would not recover.
#[derive(Debug, Clone)]
pub struct ChangeHub {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeHub {
    /// Creates a hub with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribes to change notifications. Drop the receiver to
    /// unsubscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Publishes a change for the given collection.
    ///
    /// Best effort: an error just means nobody is listening right now.
    pub fn publish(&self, collection: Collection) {
        trace!(table = collection.table(), "publishing change");
        let _ = self.tx.send(ChangeEvent { collection });
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new(256)
    }
}
