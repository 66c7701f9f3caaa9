//! Project repository and reference-data sync layer for Postflow.
//!
//! This crate keeps a reactive consumer in sync with the remote store:
//! - `ProjectRepository`: the in-memory project collection, its
//!   filtered view, and the create/update-status mutations
//! - `ReferenceDirectory`: deduplicated client/editor name lists with
//!   add-if-new semantics
//! - `ProjectFilter`: pure, stable filtering by status/editor/client
//! - `InvalidationListener`: full re-fetch on every store change signal
//!
//! # Example
//!
//! ```no_run
//! use postflow_models::ProjectDraft;
//! use postflow_session::{Identity, SessionProvider, StaticProvider};
//! use postflow_store::InMemoryStore;
//! use postflow_sync::ProjectRepository;
//! use std::sync::Arc;
//!
//! # async fn example() -> postflow_sync::Result<()> {
//! let store = Arc::new(InMemoryStore::new());
//! let provider = StaticProvider::signed_in(Identity::new("user-1", "Jo"));
//! let session = SessionProvider::new(Arc::new(provider), store.clone());
//! # let _ = session.resolve().await;
//!
//! let repository = ProjectRepository::new(store, session.watch());
//! repository.fetch_all().await?;
//!
//! let id = repository
//!     .create(ProjectDraft::new("Promo Video", "Acme", "Jo"))
//!     .await?;
//! println!("created {}", id);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod filter;
pub mod listener;
pub mod reference;
pub mod repository;

pub use error::{Result, SyncError};
pub use filter::ProjectFilter;
pub use listener::InvalidationListener;
pub use reference::ReferenceDirectory;
pub use repository::ProjectRepository;
