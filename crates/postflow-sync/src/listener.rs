//! Invalidation listener: drives re-fetches from the store change feed.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use postflow_store::ChangeEvent;

use crate::repository::ProjectRepository;

/// Watches the store's change feed and re-fetches on every signal.
///
/// Notifications are invalidation-only; whichever collection changed,
/// the response is the same full re-fetch, never delta application. A
/// failed re-fetch is logged and the loop keeps going: the next signal
/// retries, and the repository has already surfaced the error state.
pub struct InvalidationListener {
    /// The repository to refresh.
    repository: Arc<ProjectRepository>,
    /// Change feed subscription, taken at construction so signals
    /// emitted before the loop first polls are not lost.
    changes: broadcast::Receiver<ChangeEvent>,
    /// Shutdown signal receiver.
    shutdown: watch::Receiver<bool>,
}

impl InvalidationListener {
    /// Creates a new listener.
    pub fn new(repository: Arc<ProjectRepository>, shutdown: watch::Receiver<bool>) -> Self {
        let changes = repository.changes();
        Self {
            repository,
            changes,
            shutdown,
        }
    }

    /// Run the listening loop until shutdown signal.
    pub async fn run(&mut self) {
        debug!("starting invalidation listener");

        loop {
            tokio::select! {
                change = self.changes.recv() => {
                    match change {
                        Ok(event) => {
                            debug!(table = event.collection.table(), "change received, refetching");
                            self.refetch().await;
                        }
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            // Missed signals collapse into one refetch.
                            warn!(missed, "change feed lagged, refetching");
                            self.refetch().await;
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            debug!("change feed closed");
                            break;
                        }
                    }
                }
                _ = self.shutdown.changed() => {
                    if *self.shutdown.borrow() {
                        debug!("invalidation listener received shutdown signal");
                        break;
                    }
                }
            }
        }

        debug!("invalidation listener stopped");
    }

    async fn refetch(&self) {
        if let Err(e) = self.repository.fetch_all().await {
            warn!(error = %e, "refetch after invalidation failed");
        }
    }
}
