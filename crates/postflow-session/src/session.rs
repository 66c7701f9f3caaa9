//! Session provider: process-wide authenticated-identity state.
//!
//! Data-access components watch the session state and must not query
//! while it is still `Unknown`. State lives in a `tokio::sync::watch`
//! channel so observers always see the latest resolved value.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use postflow_store::{ProjectStore, StoreError};

use crate::error::Result;
use crate::provider::{AuthChange, Identity, IdentityProvider};

/// Lifecycle of the session.
///
/// `Unknown -> (session check resolves) -> Authenticated | Anonymous`;
/// `Authenticated -> (sign-out) -> Anonymous`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Initial state, before the session check resolves. Data layers
    /// must not query yet.
    #[default]
    Unknown,
    /// A user is signed in.
    Authenticated(Identity),
    /// The session check resolved with nobody signed in.
    Anonymous,
}

/// Tracks the authenticated identity and exposes it process-wide.
pub struct SessionProvider {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn ProjectStore>,
    state_tx: watch::Sender<SessionState>,
    /// Auth change subscription, taken at construction so changes
    /// emitted before [`run`](Self::run) first polls are not lost.
    auth_changes: Mutex<Option<broadcast::Receiver<AuthChange>>>,
}

impl SessionProvider {
    /// Creates a provider in the `Unknown` state.
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<dyn ProjectStore>) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Unknown);
        let auth_changes = Mutex::new(Some(provider.subscribe()));
        Self {
            provider,
            store,
            state_tx,
            auth_changes,
        }
    }

    /// Performs the initial session check, resolving the `Unknown`
    /// state.
    pub async fn resolve(&self) -> Result<SessionState> {
        let state = match self.provider.current_session().await? {
            Some(identity) => {
                self.ensure_profile(&identity).await;
                SessionState::Authenticated(identity)
            }
            None => SessionState::Anonymous,
        };

        debug!(state = state_label(&state), "session resolved");
        self.state_tx.send_replace(state.clone());
        Ok(state)
    }

    /// Returns a receiver observing session state transitions.
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    /// The signed-in identity, if any.
    pub fn identity(&self) -> Option<Identity> {
        match self.state() {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    /// True until the initial session check resolves.
    pub fn is_loading(&self) -> bool {
        self.state() == SessionState::Unknown
    }

    /// Signs the user out and transitions to `Anonymous`.
    pub async fn sign_out(&self) -> Result<()> {
        self.provider.sign_out().await?;
        self.state_tx.send_replace(SessionState::Anonymous);
        Ok(())
    }

    /// Drives provider notifications into state transitions until the
    /// shutdown signal flips.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut changes = self
            .auth_changes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            // Re-run after a previous loop ended: fresh subscription.
            .unwrap_or_else(|| self.provider.subscribe());

        loop {
            tokio::select! {
                change = changes.recv() => {
                    match change {
                        Ok(AuthChange::SignedIn(identity)) => {
                            self.ensure_profile(&identity).await;
                            self.state_tx.send_replace(SessionState::Authenticated(identity));
                        }
                        Ok(AuthChange::SignedOut) => {
                            self.state_tx.send_replace(SessionState::Anonymous);
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(missed, "auth change stream lagged");
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                            debug!("auth change stream closed");
                            break;
                        }
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        debug!("session provider received shutdown signal");
                        break;
                    }
                }
            }
        }
    }

    /// Creates the identity's profile row if absent.
    ///
    /// Tolerant of races: a concurrent creation (`Conflict`) is success.
    /// Profile creation is best effort; other failures are logged and
    /// do not block the session.
    async fn ensure_profile(&self, identity: &Identity) {
        match self.store.ensure_profile(&identity.user_id).await {
            Ok(()) | Err(StoreError::Conflict(_)) => {}
            Err(e) => {
                warn!(user_id = %identity.user_id, error = %e, "failed to ensure profile");
            }
        }
    }
}

fn state_label(state: &SessionState) -> &'static str {
    match state {
        SessionState::Unknown => "unknown",
        SessionState::Authenticated(_) => "authenticated",
        SessionState::Anonymous => "anonymous",
    }
}
