//! Session state tracking for Postflow.
//!
//! This crate provides the `SessionProvider` that resolves and tracks
//! the authenticated identity all data access is scoped by:
//! - Explicit `Unknown -> Authenticated | Anonymous` lifecycle
//! - `tokio::sync::watch` state observed by the data layers
//! - Profile creation on sign-in, tolerant of concurrent creation
//!
//! # Example
//!
//! ```no_run
//! use postflow_session::{Identity, SessionProvider, StaticProvider};
//! use postflow_store::InMemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> postflow_session::Result<()> {
//! let provider = StaticProvider::signed_in(Identity::new("user-1", "Jo"));
//! let store = Arc::new(InMemoryStore::new());
//!
//! let session = SessionProvider::new(Arc::new(provider), store);
//! session.resolve().await?;
//!
//! assert!(session.identity().is_some());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod provider;
pub mod session;

pub use error::{Result, SessionError};
pub use provider::{AuthChange, Identity, IdentityProvider, StaticProvider};
pub use session::{SessionProvider, SessionState};
