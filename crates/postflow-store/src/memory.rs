//! In-memory store backend.
//!
//! Behaves like the hosted store, including the parts the sync layer
//! treats as black boxes: the trigger that seeds a new project's first
//! timeline entry, the `(owner, kind, name)` uniqueness constraint, and
//! the change feed published after every committed write. Serves as the
//! test double for every concurrency property in the sync layer.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use async_trait::async_trait;
use postflow_models::{Project, ProjectDraft, ProjectId, ProjectStatus, ReferenceKind, TimelineEntry, UserId};

use crate::change::{ChangeEvent, ChangeHub, Collection};
use crate::error::{Result, StoreError};
use crate::store::ProjectStore;

/// Attribution the store writes on trigger-seeded timeline entries.
const SEED_ACTOR: &str = "System";

/// A project row plus its owner column.
#[derive(Debug, Clone)]
struct ProjectRow {
    owner: UserId,
    project: Project,
}

#[derive(Debug, Default)]
struct Tables {
    projects: Vec<ProjectRow>,
    timeline: Vec<TimelineEntry>,
    names: HashMap<(UserId, ReferenceKind), Vec<String>>,
    profiles: HashSet<UserId>,
}

/// In-memory implementation of [`ProjectStore`].
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    hub: ChangeHub,
    offline: AtomicBool,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            hub: ChangeHub::default(),
            offline: AtomicBool::new(false),
        }
    }

    /// Simulates losing (or regaining) the connection: while offline
    /// every call fails with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// True when a profile row exists for the owner.
    pub async fn has_profile(&self, owner: &UserId) -> bool {
        self.tables.read().await.profiles.contains(owner)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        Ok(())
    }

    fn name_collection(kind: ReferenceKind) -> Collection {
        match kind {
            ReferenceKind::Client => Collection::Clients,
            ReferenceKind::Editor => Collection::Editors,
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProjectStore for InMemoryStore {
    async fn list_projects(&self, owner: &UserId) -> Result<Vec<Project>> {
        self.check_online()?;
        let tables = self.tables.read().await;

        let mut projects: Vec<Project> = tables
            .projects
            .iter()
            .filter(|row| row.owner == *owner)
            .map(|row| row.project.clone())
            .collect();

        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn list_timeline(&self, project_id: &ProjectId) -> Result<Vec<TimelineEntry>> {
        self.check_online()?;
        let tables = self.tables.read().await;

        let mut entries: Vec<TimelineEntry> = tables
            .timeline
            .iter()
            .filter(|e| e.project_id == *project_id)
            .cloned()
            .collect();

        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }

    async fn insert_project(&self, owner: &UserId, draft: &ProjectDraft) -> Result<Project> {
        self.check_online()?;
        let project = Project::new(
            draft.title.clone(),
            draft.client_name.clone(),
            draft.assigned_editor.clone(),
            draft.status,
        );

        {
            let mut tables = self.tables.write().await;
            tables.projects.push(ProjectRow {
                owner: owner.clone(),
                project: project.clone(),
            });
            // Trigger equivalent: seed the timeline with the initial status.
            tables.timeline.push(TimelineEntry::new(
                project.id.clone(),
                draft.status,
                None,
                SEED_ACTOR,
            ));
        }

        debug!(project_id = %project.id, "inserted project");
        self.hub.publish(Collection::Projects);
        self.hub.publish(Collection::ProjectTimeline);
        Ok(project)
    }

    async fn set_project_status(
        &self,
        project_id: &ProjectId,
        status: ProjectStatus,
    ) -> Result<()> {
        self.check_online()?;
        {
            let mut tables = self.tables.write().await;
            let row = tables
                .projects
                .iter_mut()
                .find(|row| row.project.id == *project_id)
                .ok_or_else(|| StoreError::NotFound {
                    kind: "project".to_string(),
                    id: project_id.to_string(),
                })?;
            row.project.status = status;
        }

        self.hub.publish(Collection::Projects);
        Ok(())
    }

    async fn insert_timeline_entry(
        &self,
        project_id: &ProjectId,
        status: ProjectStatus,
        comment: Option<String>,
        updated_by: &str,
    ) -> Result<TimelineEntry> {
        self.check_online()?;
        let entry = {
            let mut tables = self.tables.write().await;
            // Foreign reference: the parent project must still exist.
            if !tables
                .projects
                .iter()
                .any(|row| row.project.id == *project_id)
            {
                return Err(StoreError::NotFound {
                    kind: "project".to_string(),
                    id: project_id.to_string(),
                });
            }

            let entry = TimelineEntry::new(project_id.clone(), status, comment, updated_by);
            tables.timeline.push(entry.clone());
            entry
        };

        self.hub.publish(Collection::ProjectTimeline);
        Ok(entry)
    }

    async fn list_names(&self, owner: &UserId, kind: ReferenceKind) -> Result<Vec<String>> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .names
            .get(&(owner.clone(), kind))
            .cloned()
            .unwrap_or_default())
    }

    async fn name_exists(&self, owner: &UserId, kind: ReferenceKind, name: &str) -> Result<bool> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .names
            .get(&(owner.clone(), kind))
            .map(|names| names.iter().any(|n| n == name))
            .unwrap_or(false))
    }

    async fn insert_name(&self, owner: &UserId, kind: ReferenceKind, name: &str) -> Result<()> {
        self.check_online()?;
        {
            let mut tables = self.tables.write().await;
            let names = tables.names.entry((owner.clone(), kind)).or_default();
            // Unique (owner, kind, name).
            if names.iter().any(|n| n == name) {
                return Err(StoreError::Conflict(format!(
                    "{} already exists: {}",
                    kind.label(),
                    name
                )));
            }
            names.push(name.to_string());
        }

        debug!(kind = kind.label(), name, "inserted reference name");
        self.hub.publish(Self::name_collection(kind));
        Ok(())
    }

    async fn ensure_profile(&self, owner: &UserId) -> Result<()> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        tables.profiles.insert(owner.clone());
        Ok(())
    }

    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.hub.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn owner() -> UserId {
        UserId::from_string("user-1")
    }

    #[tokio::test]
    async fn test_insert_project_seeds_timeline() {
        let store = InMemoryStore::new();
        let draft = ProjectDraft::new("Promo Video", "Acme", "Jo");

        let project = store.insert_project(&owner(), &draft).await.unwrap();
        let timeline = store.list_timeline(&project.id).await.unwrap();

        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].status, ProjectStatus::Pending);
        assert_eq!(timeline[0].updated_by, SEED_ACTOR);
    }

    #[tokio::test]
    async fn test_list_projects_scoped_by_owner_newest_first() {
        let store = InMemoryStore::new();
        let other = UserId::from_string("user-2");

        store
            .insert_project(&owner(), &ProjectDraft::new("First", "Acme", "Jo"))
            .await
            .unwrap();
        store
            .insert_project(&owner(), &ProjectDraft::new("Second", "Acme", "Jo"))
            .await
            .unwrap();
        store
            .insert_project(&other, &ProjectDraft::new("Foreign", "Bar", "Sam"))
            .await
            .unwrap();

        let projects = store.list_projects(&owner()).await.unwrap();

        assert_eq!(projects.len(), 2);
        assert!(projects.iter().all(|p| p.title != "Foreign"));
        assert!(projects[0].created_at >= projects[1].created_at);
    }

    #[tokio::test]
    async fn test_set_status_unknown_project_not_found() {
        let store = InMemoryStore::new();
        let result = store
            .set_project_status(&ProjectId::from_string("proj-missing"), ProjectStatus::Review)
            .await;

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_insert_entry_unknown_project_not_found() {
        let store = InMemoryStore::new();
        let result = store
            .insert_timeline_entry(
                &ProjectId::from_string("proj-missing"),
                ProjectStatus::Review,
                None,
                "Jo",
            )
            .await;

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_timeline_ordered_oldest_first() {
        let store = InMemoryStore::new();
        let project = store
            .insert_project(&owner(), &ProjectDraft::new("Promo Video", "Acme", "Jo"))
            .await
            .unwrap();

        store
            .insert_timeline_entry(&project.id, ProjectStatus::Editing, None, "Jo")
            .await
            .unwrap();
        store
            .insert_timeline_entry(&project.id, ProjectStatus::Review, None, "Jo")
            .await
            .unwrap();

        let timeline = store.list_timeline(&project.id).await.unwrap();
        assert_eq!(timeline.len(), 3);
        assert!(timeline.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(timeline.last().unwrap().status, ProjectStatus::Review);
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let store = InMemoryStore::new();

        store
            .insert_name(&owner(), ReferenceKind::Client, "Acme")
            .await
            .unwrap();
        let result = store
            .insert_name(&owner(), ReferenceKind::Client, "Acme")
            .await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_same_name_different_owner_ok() {
        let store = InMemoryStore::new();
        let other = UserId::from_string("user-2");

        store
            .insert_name(&owner(), ReferenceKind::Client, "Acme")
            .await
            .unwrap();
        store
            .insert_name(&other, ReferenceKind::Client, "Acme")
            .await
            .unwrap();

        assert!(store
            .name_exists(&owner(), ReferenceKind::Client, "Acme")
            .await
            .unwrap());
        assert!(store
            .name_exists(&other, ReferenceKind::Client, "Acme")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_same_name_different_kind_ok() {
        let store = InMemoryStore::new();

        store
            .insert_name(&owner(), ReferenceKind::Client, "Jo")
            .await
            .unwrap();
        store
            .insert_name(&owner(), ReferenceKind::Editor, "Jo")
            .await
            .unwrap();

        assert_eq!(
            store.list_names(&owner(), ReferenceKind::Client).await.unwrap(),
            vec!["Jo"]
        );
        assert_eq!(
            store.list_names(&owner(), ReferenceKind::Editor).await.unwrap(),
            vec!["Jo"]
        );
    }

    #[tokio::test]
    async fn test_ensure_profile_idempotent() {
        let store = InMemoryStore::new();

        store.ensure_profile(&owner()).await.unwrap();
        store.ensure_profile(&owner()).await.unwrap();
    }

    #[tokio::test]
    async fn test_offline_fails_unavailable() {
        let store = InMemoryStore::new();
        store.set_offline(true);

        let result = store.list_projects(&owner()).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));

        store.set_offline(false);
        assert!(store.list_projects(&owner()).await.is_ok());
    }

    #[tokio::test]
    async fn test_writes_publish_changes() {
        let store = InMemoryStore::new();
        let mut rx = store.changes();

        store
            .insert_project(&owner(), &ProjectDraft::new("Promo Video", "Acme", "Jo"))
            .await
            .unwrap();

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.collection, Collection::Projects);
        assert_eq!(second.collection, Collection::ProjectTimeline);
    }

    #[tokio::test]
    async fn test_concurrent_project_inserts() {
        let store = Arc::new(InMemoryStore::new());
        let mut handles = Vec::new();

        for i in 0..10 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let draft = ProjectDraft::new(format!("Project {}", i), "Acme", "Jo");
                store.insert_project(&UserId::from_string("user-1"), &draft).await
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let projects = store.list_projects(&owner()).await.unwrap();
        assert_eq!(projects.len(), 10);
    }
}
