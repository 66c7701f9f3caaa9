//! Remote store contract and backends for Postflow.
//!
//! This crate defines the [`ProjectStore`] trait the sync layer depends
//! on, plus two backends:
//! - [`InMemoryStore`]: full store semantics in memory, the test double
//! - [`RestStore`]: PostgREST-dialect HTTP backend for the hosted store
//!
//! The store's realtime feed is surfaced as a `broadcast` channel of
//! [`ChangeEvent`] invalidation signals; see [`ChangeHub`].
//!
//! # Example
//!
//! ```no_run
//! use postflow_store::{InMemoryStore, ProjectStore};
//! use postflow_models::{ProjectDraft, UserId};
//!
//! # async fn example() -> postflow_store::Result<()> {
//! let store = InMemoryStore::new();
//! let owner = UserId::from_string("user-1");
//!
//! let project = store
//!     .insert_project(&owner, &ProjectDraft::new("Promo Video", "Acme", "Jo"))
//!     .await?;
//!
//! // The store seeded the first timeline entry itself.
//! let timeline = store.list_timeline(&project.id).await?;
//! assert_eq!(timeline.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod change;
pub mod error;
pub mod memory;
pub mod rest;
pub mod store;

pub use change::{ChangeEvent, ChangeHub, Collection};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use rest::RestStore;
pub use store::ProjectStore;
