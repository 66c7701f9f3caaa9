//! ProjectStore trait definition for remote store backends.
//!
//! This module defines the interface the sync layer depends on,
//! allowing different backing stores (hosted PostgREST dialect,
//! in-memory for tests) behind one contract.
//!
//! All rows are scoped by an owning user; no call crosses owners.
//! The store, not the caller, is responsible for:
//! - assigning ids and creation timestamps,
//! - seeding a new project's first timeline entry from its initial
//!   status (the hosted store does this with a database trigger),
//! - enforcing uniqueness of `(owner, kind, name)` reference names.

use async_trait::async_trait;
use tokio::sync::broadcast;

use postflow_models::{Project, ProjectDraft, ProjectId, ProjectStatus, ReferenceKind, TimelineEntry, UserId};

use crate::change::ChangeEvent;
use crate::error::Result;

/// Trait for remote store backends.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Lists the owner's projects, newest first.
    ///
    /// Returned projects carry an empty timeline; fetch timelines
    /// separately with [`list_timeline`](Self::list_timeline).
    async fn list_projects(&self, owner: &UserId) -> Result<Vec<Project>>;

    /// Lists a project's timeline entries, oldest first.
    async fn list_timeline(&self, project_id: &ProjectId) -> Result<Vec<TimelineEntry>>;

    /// Inserts a new project and returns the stored row.
    ///
    /// The store seeds the first timeline entry from the draft's status;
    /// read it back with [`list_timeline`](Self::list_timeline).
    async fn insert_project(&self, owner: &UserId, draft: &ProjectDraft) -> Result<Project>;

    /// Sets a project's current status.
    ///
    /// Fails with `NotFound` when the row no longer exists.
    async fn set_project_status(&self, project_id: &ProjectId, status: ProjectStatus)
        -> Result<()>;

    /// Appends a timeline entry and returns the stored row.
    ///
    /// Fails with `NotFound` when the project no longer exists.
    async fn insert_timeline_entry(
        &self,
        project_id: &ProjectId,
        status: ProjectStatus,
        comment: Option<String>,
        updated_by: &str,
    ) -> Result<TimelineEntry>;

    /// Lists the owner's reference names of the given kind.
    async fn list_names(&self, owner: &UserId, kind: ReferenceKind) -> Result<Vec<String>>;

    /// Exact-match existence check for a reference name.
    async fn name_exists(&self, owner: &UserId, kind: ReferenceKind, name: &str) -> Result<bool>;

    /// Inserts a reference name.
    ///
    /// The store enforces uniqueness of `(owner, kind, name)`; inserting
    /// a duplicate fails with `Conflict`.
    async fn insert_name(&self, owner: &UserId, kind: ReferenceKind, name: &str) -> Result<()>;

    /// Creates the owner's profile row if absent.
    ///
    /// Idempotent: a concurrent duplicate creation is success.
    async fn ensure_profile(&self, owner: &UserId) -> Result<()>;

    /// Subscribes to the store's change feed. Drop the receiver to
    /// unsubscribe.
    fn changes(&self) -> broadcast::Receiver<ChangeEvent>;
}
