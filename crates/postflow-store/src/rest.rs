//! Hosted store backend speaking the PostgREST dialect.
//!
//! The production deployment exposes its relational store through a
//! PostgREST-style data API (`?owner=eq.{id}&order=created_at.desc`
//! query grammar, `Prefer: return=representation` on writes). This
//! backend covers the query/mutation surface only; the realtime
//! transport is deliberately out of scope. Whatever transport the
//! embedding application uses feeds invalidations in through
//! [`RestStore::notify`].

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::debug;
use url::Url;

use postflow_models::{Project, ProjectDraft, ProjectId, ProjectStatus, ReferenceKind, TimelineEntry, UserId};

use crate::change::{ChangeEvent, ChangeHub, Collection};
use crate::error::{Result, StoreError};
use crate::store::ProjectStore;

#[derive(Debug, Deserialize)]
struct NameRow {
    name: String,
}

/// [`ProjectStore`] backend over a PostgREST-dialect HTTP API.
pub struct RestStore {
    http: reqwest::Client,
    base: Url,
    api_key: String,
    hub: ChangeHub,
}

impl RestStore {
    /// Creates a backend rooted at `base` (the data API root, e.g.
    /// `https://example.supabase.co/rest/v1/`), authenticating with
    /// `api_key`.
    pub fn new(mut base: Url, api_key: impl Into<String>) -> Self {
        // Url::join drops the last path segment without this.
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Self {
            http: reqwest::Client::new(),
            base,
            api_key: api_key.into(),
            hub: ChangeHub::default(),
        }
    }

    /// Feeds an externally observed change into the feed.
    ///
    /// Called by whatever realtime transport the embedding application
    /// wires up (websocket, SSE, polling).
    pub fn notify(&self, collection: Collection) {
        self.hub.publish(collection);
    }

    fn endpoint(&self, table: &str) -> Result<Url> {
        self.base
            .join(table)
            .map_err(|e| StoreError::Malformed(format!("bad endpoint {}: {}", table, e)))
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn get(&self, url: Url) -> RequestBuilder {
        self.authed(self.http.get(url))
    }

    fn write(&self, req: RequestBuilder) -> RequestBuilder {
        self.authed(req).header("Prefer", "return=representation")
    }
}

#[async_trait]
impl ProjectStore for RestStore {
    async fn list_projects(&self, owner: &UserId) -> Result<Vec<Project>> {
        let url = self.endpoint(Collection::Projects.table())?;
        let rows: Vec<Project> = self
            .get(url)
            .query(&[
                ("owner", format!("eq.{}", owner)),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(count = rows.len(), "fetched projects");
        Ok(rows)
    }

    async fn list_timeline(&self, project_id: &ProjectId) -> Result<Vec<TimelineEntry>> {
        let url = self.endpoint(Collection::ProjectTimeline.table())?;
        let rows: Vec<TimelineEntry> = self
            .get(url)
            .query(&[
                ("project_id", format!("eq.{}", project_id)),
                ("order", "timestamp.asc".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(rows)
    }

    async fn insert_project(&self, owner: &UserId, draft: &ProjectDraft) -> Result<Project> {
        let url = self.endpoint(Collection::Projects.table())?;
        let body = json!({
            "title": draft.title,
            "client_name": draft.client_name,
            "assigned_editor": draft.assigned_editor,
            "status": draft.status,
            "owner": owner,
        });

        let rows: Vec<Project> = self
            .write(self.http.post(url))
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Malformed("insert returned no project row".to_string()))
    }

    async fn set_project_status(
        &self,
        project_id: &ProjectId,
        status: ProjectStatus,
    ) -> Result<()> {
        let url = self.endpoint(Collection::Projects.table())?;
        let rows: Vec<serde_json::Value> = self
            .write(self.http.patch(url))
            .query(&[("id", format!("eq.{}", project_id))])
            .json(&json!({ "status": status }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // A patch that matched nothing means the row is gone.
        if rows.is_empty() {
            return Err(StoreError::NotFound {
                kind: "project".to_string(),
                id: project_id.to_string(),
            });
        }
        Ok(())
    }

    async fn insert_timeline_entry(
        &self,
        project_id: &ProjectId,
        status: ProjectStatus,
        comment: Option<String>,
        updated_by: &str,
    ) -> Result<TimelineEntry> {
        let url = self.endpoint(Collection::ProjectTimeline.table())?;
        let body = json!({
            "project_id": project_id,
            "status": status,
            "comment": comment,
            "updated_by": updated_by,
        });

        let resp = self.write(self.http.post(url)).json(&body).send().await?;
        // The only constraint on this table is the project foreign key.
        if resp.status() == StatusCode::CONFLICT {
            return Err(StoreError::NotFound {
                kind: "project".to_string(),
                id: project_id.to_string(),
            });
        }

        let rows: Vec<TimelineEntry> = resp.error_for_status()?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Malformed("insert returned no timeline row".to_string()))
    }

    async fn list_names(&self, owner: &UserId, kind: ReferenceKind) -> Result<Vec<String>> {
        let url = self.endpoint(kind.collection())?;
        let rows: Vec<NameRow> = self
            .get(url)
            .query(&[
                ("owner", format!("eq.{}", owner)),
                ("select", "name".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(rows.into_iter().map(|row| row.name).collect())
    }

    async fn name_exists(&self, owner: &UserId, kind: ReferenceKind, name: &str) -> Result<bool> {
        let url = self.endpoint(kind.collection())?;
        let rows: Vec<NameRow> = self
            .get(url)
            .query(&[
                ("owner", format!("eq.{}", owner)),
                ("name", format!("eq.{}", name)),
                ("select", "name".to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(!rows.is_empty())
    }

    async fn insert_name(&self, owner: &UserId, kind: ReferenceKind, name: &str) -> Result<()> {
        let url = self.endpoint(kind.collection())?;
        let resp = self
            .write(self.http.post(url))
            .json(&json!({ "name": name, "owner": owner }))
            .send()
            .await?;

        if resp.status() == StatusCode::CONFLICT {
            return Err(StoreError::Conflict(format!(
                "{} already exists: {}",
                kind.label(),
                name
            )));
        }
        resp.error_for_status()?;
        Ok(())
    }

    async fn ensure_profile(&self, owner: &UserId) -> Result<()> {
        let url = self.endpoint("profiles")?;
        let resp = self
            .authed(self.http.post(url))
            .json(&json!({ "id": owner }))
            .send()
            .await?;

        // A concurrent creation already made the row; that is success.
        if resp.status() == StatusCode::CONFLICT {
            return Ok(());
        }
        resp.error_for_status()?;
        Ok(())
    }

    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.hub.subscribe()
    }
}
