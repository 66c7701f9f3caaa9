//! Project repository: the in-memory project collection and its
//! synchronization with the remote store.
//!
//! The repository is the single writer for its state. Remote operations
//! are async and may complete out of call order; the in-memory layer is
//! last-write-wins, with the store's change feed as the backstop that
//! eventually reconciles local state with remote truth (see
//! [`InvalidationListener`](crate::listener::InvalidationListener)).

use std::sync::Arc;

use tokio::sync::{broadcast, watch, RwLock};
use tracing::{debug, info, warn};

use postflow_models::{Project, ProjectDraft, ProjectId, ProjectStatus, ReferenceKind, UserId};
use postflow_session::{Identity, SessionState};
use postflow_store::{ChangeEvent, ProjectStore};

use crate::error::{Result, SyncError};
use crate::filter::ProjectFilter;
use crate::reference::ReferenceDirectory;

#[derive(Debug, Default)]
struct RepoState {
    projects: Vec<Project>,
    visible: Vec<Project>,
    filter: ProjectFilter,
    loading: bool,
    last_error: Option<String>,
}

impl RepoState {
    /// Recomputes the visible view under the active filter. Called on
    /// every change to either the project set or the criteria.
    fn rederive(&mut self) {
        self.visible = self.filter.apply(&self.projects);
    }
}

/// Fetches, mutates, and filters the session's projects.
pub struct ProjectRepository {
    store: Arc<dyn ProjectStore>,
    session: watch::Receiver<SessionState>,
    references: Arc<ReferenceDirectory>,
    state: RwLock<RepoState>,
}

impl ProjectRepository {
    /// Creates a repository bound to a session.
    pub fn new(store: Arc<dyn ProjectStore>, session: watch::Receiver<SessionState>) -> Self {
        let references = Arc::new(ReferenceDirectory::new(store.clone()));
        Self {
            store,
            session,
            references,
            state: RwLock::new(RepoState::default()),
        }
    }

    /// The reference-name directory kept fresh by this repository.
    pub fn references(&self) -> Arc<ReferenceDirectory> {
        Arc::clone(&self.references)
    }

    /// Subscribes to the store's change feed (invalidation signals).
    pub fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.store.changes()
    }

    fn identity(&self) -> Option<Identity> {
        match &*self.session.borrow() {
            SessionState::Authenticated(identity) => Some(identity.clone()),
            _ => None,
        }
    }

    fn require_identity(&self) -> Result<Identity> {
        self.identity()
            .ok_or_else(|| SyncError::Validation("no authenticated session".to_string()))
    }

    /// Replaces the in-memory snapshot with the remote state: the
    /// session's projects (newest first, each with its full timeline)
    /// and both reference-name lists.
    ///
    /// A no-op while the session is `Unknown` or `Anonymous`. On
    /// failure the previous snapshot is retained, the error is recorded
    /// for presentation, and the loading flag is always cleared.
    pub async fn fetch_all(&self) -> Result<()> {
        let Some(identity) = self.identity() else {
            debug!("skipping fetch: no authenticated session");
            return Ok(());
        };

        self.state.write().await.loading = true;

        match self.fetch_snapshot(&identity.user_id).await {
            Ok((projects, clients, editors)) => {
                self.references.replace(ReferenceKind::Client, clients);
                self.references.replace(ReferenceKind::Editor, editors);

                let mut state = self.state.write().await;
                debug!(count = projects.len(), "loaded projects");
                state.projects = projects;
                state.last_error = None;
                state.loading = false;
                state.rederive();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to load projects");
                let message = e.to_string();
                let mut state = self.state.write().await;
                state.last_error = Some(message.clone());
                state.loading = false;
                Err(SyncError::Unavailable(message))
            }
        }
    }

    async fn fetch_snapshot(
        &self,
        owner: &UserId,
    ) -> postflow_store::Result<(Vec<Project>, Vec<String>, Vec<String>)> {
        let mut projects = self.store.list_projects(owner).await?;
        for project in &mut projects {
            project.timeline = self.store.list_timeline(&project.id).await?;
        }

        let clients = self.store.list_names(owner, ReferenceKind::Client).await?;
        let editors = self.store.list_names(owner, ReferenceKind::Editor).await?;
        Ok((projects, clients, editors))
    }

    /// Persists a new project and reflects it locally.
    ///
    /// Validation happens before any remote call. The store seeds the
    /// first timeline entry from the initial status; it is read back so
    /// the project is fully loaded before it becomes visible. Ensures
    /// the draft's client and editor names exist in the reference
    /// lists, then returns the new project's id.
    pub async fn create(&self, draft: ProjectDraft) -> Result<ProjectId> {
        let identity = self.require_identity()?;
        validate_draft(&draft)?;

        let mut project = self.store.insert_project(&identity.user_id, &draft).await?;
        project.timeline = self.store.list_timeline(&project.id).await?;
        let project_id = project.id.clone();

        {
            let mut state = self.state.write().await;
            // Newest first, matching remote ordering.
            state.projects.insert(0, project);
            state.rederive();
        }

        // Reference completeness even when this project is the first
        // use of a name. The project row is already committed, so a
        // failure here is logged, not surfaced as a failed create; the
        // invalidation backstop reconciles the lists.
        for (kind, name) in [
            (ReferenceKind::Client, draft.client_name.as_str()),
            (ReferenceKind::Editor, draft.assigned_editor.as_str()),
        ] {
            if let Err(e) = self.references.add_if_new(&identity.user_id, kind, name).await {
                warn!(kind = kind.label(), name, error = %e, "failed to record reference name");
            }
        }

        info!(project_id = %project_id, title = %draft.title, "project created");
        Ok(project_id)
    }

    /// Moves a project to a new status, appending the timeline entry
    /// that records the transition.
    ///
    /// Both remote writes must succeed before anything changes locally;
    /// on any failure the local collection is left untouched. Callers
    /// enforce the "no transition to the same status" business rule.
    pub async fn update_status(
        &self,
        project_id: &ProjectId,
        new_status: ProjectStatus,
        comment: Option<String>,
        actor: &str,
    ) -> Result<()> {
        self.require_identity()?;

        self.store.set_project_status(project_id, new_status).await?;
        let entry = self
            .store
            .insert_timeline_entry(project_id, new_status, comment, actor)
            .await?;

        {
            let mut state = self.state.write().await;
            if let Some(project) = state.projects.iter_mut().find(|p| p.id == *project_id) {
                project.push_entry(entry);
            }
            state.rederive();
        }

        info!(project_id = %project_id, status = %new_status, "project status updated");
        Ok(())
    }

    /// Replaces the filter criteria and re-derives the visible view.
    pub async fn set_filter(&self, filter: ProjectFilter) {
        let mut state = self.state.write().await;
        state.filter = filter;
        state.rederive();
    }

    /// The active filter criteria.
    pub async fn filter(&self) -> ProjectFilter {
        self.state.read().await.filter.clone()
    }

    /// The filtered view: projects matching the active criteria, in
    /// snapshot order.
    pub async fn visible(&self) -> Vec<Project> {
        self.state.read().await.visible.clone()
    }

    /// The full unfiltered snapshot.
    pub async fn all(&self) -> Vec<Project> {
        self.state.read().await.projects.clone()
    }

    /// True while a fetch is in flight. Distinct from the error state:
    /// a failed fetch clears this flag.
    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// The most recent fetch failure, cleared by the next successful
    /// fetch.
    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }
}

fn validate_draft(draft: &ProjectDraft) -> Result<()> {
    if draft.title.trim().is_empty() {
        return Err(SyncError::Validation("title must not be empty".to_string()));
    }
    if draft.client_name.trim().is_empty() {
        return Err(SyncError::Validation(
            "client name must not be empty".to_string(),
        ));
    }
    if draft.assigned_editor.trim().is_empty() {
        return Err(SyncError::Validation(
            "assigned editor must not be empty".to_string(),
        ));
    }
    Ok(())
}
