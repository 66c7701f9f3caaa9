//! Identity provider abstraction.
//!
//! The authentication service is an external collaborator: it holds the
//! session, performs sign-out, and pushes signed-in/signed-out
//! notifications. This module captures that surface behind a trait so
//! the session layer can run against a fixed-identity double in tests.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::broadcast;

use postflow_models::UserId;

use crate::error::Result;

/// The authenticated actor: a stable id scoping all data, plus the
/// display name written into timeline attributions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Stable user id; every query is scoped by it.
    pub user_id: UserId,
    /// Display name used as the `updated_by` actor.
    pub display_name: String,
}

impl Identity {
    /// Creates an identity.
    pub fn new(user_id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Authentication state transitions pushed by the provider.
#[derive(Debug, Clone)]
pub enum AuthChange {
    /// A user signed in.
    SignedIn(Identity),
    /// The user signed out.
    SignedOut,
}

/// Trait for identity providers.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the current session's identity, if any.
    async fn current_session(&self) -> Result<Option<Identity>>;

    /// Terminates the current session.
    async fn sign_out(&self) -> Result<()>;

    /// Subscribes to authentication state changes. Drop the receiver to
    /// unsubscribe.
    fn subscribe(&self) -> broadcast::Receiver<AuthChange>;
}

/// Fixed-identity provider for tests and local tooling.
pub struct StaticProvider {
    identity: Mutex<Option<Identity>>,
    changes: broadcast::Sender<AuthChange>,
}

impl StaticProvider {
    /// A provider whose session check resolves to `identity`.
    pub fn signed_in(identity: Identity) -> Self {
        Self::with_session(Some(identity))
    }

    /// A provider with no session.
    pub fn signed_out() -> Self {
        Self::with_session(None)
    }

    fn with_session(identity: Option<Identity>) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            identity: Mutex::new(identity),
            changes,
        }
    }

    /// Pushes an auth change, updating the stored session to match.
    pub fn emit(&self, change: AuthChange) {
        {
            let mut identity = self
                .identity
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *identity = match &change {
                AuthChange::SignedIn(id) => Some(id.clone()),
                AuthChange::SignedOut => None,
            };
        }
        let _ = self.changes.send(change);
    }
}

#[async_trait]
impl IdentityProvider for StaticProvider {
    async fn current_session(&self) -> Result<Option<Identity>> {
        Ok(self
            .identity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn sign_out(&self) -> Result<()> {
        self.emit(AuthChange::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.changes.subscribe()
    }
}
