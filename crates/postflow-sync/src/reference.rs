//! Reference data store: deduplicated client/editor name lists.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use postflow_models::{ReferenceKind, UserId};
use postflow_store::{ProjectStore, StoreError};

use crate::error::{Result, SyncError};

/// Maintains the local snapshots of client and editor names and the
/// add-if-new upsert against the remote store.
///
/// The lists are read on every render and replaced wholesale on fetch,
/// so they sit behind a `std::sync::RwLock` rather than an async lock.
pub struct ReferenceDirectory {
    store: Arc<dyn ProjectStore>,
    lists: RwLock<HashMap<ReferenceKind, Vec<String>>>,
}

impl ReferenceDirectory {
    /// Creates a directory with empty lists.
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self {
            store,
            lists: RwLock::new(HashMap::new()),
        }
    }

    /// Current local snapshot for the kind. No remote call; the lists
    /// are kept fresh by the repository's fetch side channel.
    pub fn list(&self, kind: ReferenceKind) -> Vec<String> {
        self.lists
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    /// Replaces a kind's snapshot, deduplicating while preserving
    /// first-seen order.
    pub fn replace(&self, kind: ReferenceKind, names: Vec<String>) {
        let mut deduped: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            if !deduped.contains(&name) {
                deduped.push(name);
            }
        }

        self.lists
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, deduped);
    }

    /// Idempotent upsert-by-name scoped to `owner`.
    ///
    /// Returns `true` iff this call inserted the name. The local
    /// existence check is only a fast path; the store's uniqueness
    /// constraint on `(owner, kind, name)` decides races, and losing
    /// one is reported as "already present", not an error.
    pub async fn add_if_new(
        &self,
        owner: &UserId,
        kind: ReferenceKind,
        name: &str,
    ) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SyncError::Validation(format!(
                "{} name must not be empty",
                kind.label()
            )));
        }

        if self.store.name_exists(owner, kind, name).await? {
            return Ok(false);
        }

        let inserted = match self.store.insert_name(owner, kind, name).await {
            Ok(()) => true,
            // A concurrent writer slipped between check and insert.
            Err(StoreError::Conflict(_)) => false,
            Err(e) => return Err(e.into()),
        };

        self.remember(kind, name);
        if inserted {
            debug!(kind = kind.label(), name, "added reference name");
        }
        Ok(inserted)
    }

    /// Appends to the local list only if not already locally present,
    /// so a duplicate never renders regardless of remote race outcome.
    fn remember(&self, kind: ReferenceKind, name: &str) {
        let mut lists = self.lists.write().unwrap_or_else(PoisonError::into_inner);
        let names = lists.entry(kind).or_default();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
}
