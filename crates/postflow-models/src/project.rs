//! Project types for Postflow.
//!
//! Projects represent video-production jobs moving through a fixed
//! status lifecycle, with an append-only timeline recording every
//! status transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ids::{EntryId, ProjectId};

/// Lifecycle status of a project.
///
/// Serialized as the capitalized wire strings the remote store uses
/// (`"Pending"`, `"Editing"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProjectStatus {
    /// Footage received, editing not started.
    #[default]
    Pending,
    /// An editor is actively cutting.
    Editing,
    /// A cut is out for client review.
    Review,
    /// Final delivery accepted.
    Completed,
}

impl ProjectStatus {
    /// All statuses in lifecycle order, for pickers and filters.
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Pending,
        ProjectStatus::Editing,
        ProjectStatus::Review,
        ProjectStatus::Completed,
    ];

    /// Returns the wire/display form of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => "Pending",
            ProjectStatus::Editing => "Editing",
            ProjectStatus::Review => "Review",
            ProjectStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError(pub String);

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown project status: {}", self.0)
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for ProjectStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ProjectStatus::Pending),
            "Editing" => Ok(ProjectStatus::Editing),
            "Review" => Ok(ProjectStatus::Review),
            "Completed" => Ok(ProjectStatus::Completed),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// One immutable status transition in a project's timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Unique identifier for the entry.
    pub id: EntryId,

    /// ID of the project this entry belongs to.
    pub project_id: ProjectId,

    /// Status the project entered with this transition.
    pub status: ProjectStatus,

    /// Optional free-text note attached to the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// When the transition was recorded. Immutable.
    pub timestamp: DateTime<Utc>,

    /// Display name of the actor who made the transition.
    pub updated_by: String,
}

impl TimelineEntry {
    /// Creates a new timeline entry stamped with the current time.
    pub fn new(
        project_id: impl Into<ProjectId>,
        status: ProjectStatus,
        comment: Option<String>,
        updated_by: impl Into<String>,
    ) -> Self {
        Self {
            id: EntryId::new(),
            project_id: project_id.into(),
            status,
            comment,
            timestamp: Utc::now(),
            updated_by: updated_by.into(),
        }
    }
}

/// A tracked video-production project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier for the project.
    pub id: ProjectId,

    /// Free-text title.
    pub title: String,

    /// Client the project is delivered to. Must match an entry in the
    /// client reference list.
    pub client_name: String,

    /// Editor the project is assigned to. Must match an entry in the
    /// editor reference list.
    pub assigned_editor: String,

    /// Current lifecycle status. Always equals the status of the most
    /// recent timeline entry once the timeline is populated.
    pub status: ProjectStatus,

    /// When the project was created. Immutable.
    pub created_at: DateTime<Utc>,

    /// Status transitions, oldest first. Append-only.
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
}

impl Project {
    /// Creates a new project in the given initial status with an empty
    /// timeline.
    pub fn new(
        title: impl Into<String>,
        client_name: impl Into<String>,
        assigned_editor: impl Into<String>,
        status: ProjectStatus,
    ) -> Self {
        Self {
            id: ProjectId::new(),
            title: title.into(),
            client_name: client_name.into(),
            assigned_editor: assigned_editor.into(),
            status,
            created_at: Utc::now(),
            timeline: Vec::new(),
        }
    }

    /// Returns the most recent timeline entry by timestamp.
    pub fn latest_entry(&self) -> Option<&TimelineEntry> {
        self.timeline.iter().max_by_key(|e| e.timestamp)
    }

    /// Appends a timeline entry and moves the project to its status.
    ///
    /// The only sanctioned way to change `status` once a project exists:
    /// keeps the status equal to the latest entry.
    pub fn push_entry(&mut self, entry: TimelineEntry) {
        self.status = entry.status;
        self.timeline.push(entry);
    }

    /// True when the current status agrees with the latest timeline
    /// entry (vacuously true for an empty timeline).
    pub fn status_is_consistent(&self) -> bool {
        self.latest_entry()
            .map(|e| e.status == self.status)
            .unwrap_or(true)
    }
}

/// Input for creating a new project.
///
/// Identity, creation time, and the first timeline entry are assigned
/// by the remote store, not by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDraft {
    /// Free-text title.
    pub title: String,
    /// Client name.
    pub client_name: String,
    /// Assigned editor name.
    pub assigned_editor: String,
    /// Initial status.
    #[serde(default)]
    pub status: ProjectStatus,
}

impl ProjectDraft {
    /// Creates a draft in the default `Pending` status.
    pub fn new(
        title: impl Into<String>,
        client_name: impl Into<String>,
        assigned_editor: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            client_name: client_name.into(),
            assigned_editor: assigned_editor.into(),
            status: ProjectStatus::Pending,
        }
    }

    /// Overrides the initial status.
    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_default() {
        assert_eq!(ProjectStatus::default(), ProjectStatus::Pending);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ProjectStatus::Editing).unwrap();
        assert_eq!(json, "\"Editing\"");

        let parsed: ProjectStatus = serde_json::from_str("\"Review\"").unwrap();
        assert_eq!(parsed, ProjectStatus::Review);
    }

    #[test]
    fn test_status_rejects_unknown_string() {
        let result = serde_json::from_str::<ProjectStatus>("\"Archived\"");
        assert!(result.is_err());

        let parsed = "Archived".parse::<ProjectStatus>();
        assert_eq!(parsed, Err(ParseStatusError("Archived".to_string())));
    }

    #[test]
    fn test_status_from_str_roundtrip() {
        for status in ProjectStatus::ALL {
            assert_eq!(status.as_str().parse::<ProjectStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_project_creation() {
        let project = Project::new("Promo Video", "Acme", "Jo", ProjectStatus::Pending);

        assert!(project.id.as_str().starts_with("proj-"));
        assert_eq!(project.title, "Promo Video");
        assert_eq!(project.client_name, "Acme");
        assert_eq!(project.assigned_editor, "Jo");
        assert_eq!(project.status, ProjectStatus::Pending);
        assert!(project.timeline.is_empty());
        assert!(project.status_is_consistent());
    }

    #[test]
    fn test_push_entry_moves_status() {
        let mut project = Project::new("Promo Video", "Acme", "Jo", ProjectStatus::Pending);
        let entry = TimelineEntry::new(
            project.id.clone(),
            ProjectStatus::Editing,
            Some("started the rough cut".to_string()),
            "Jo",
        );

        project.push_entry(entry);

        assert_eq!(project.status, ProjectStatus::Editing);
        assert_eq!(project.timeline.len(), 1);
        assert!(project.status_is_consistent());
    }

    #[test]
    fn test_latest_entry_by_timestamp() {
        let mut project = Project::new("Promo Video", "Acme", "Jo", ProjectStatus::Pending);

        let mut first = TimelineEntry::new(project.id.clone(), ProjectStatus::Pending, None, "Jo");
        first.timestamp = Utc::now() - chrono::Duration::minutes(5);
        let second =
            TimelineEntry::new(project.id.clone(), ProjectStatus::Editing, None, "Jo");

        project.push_entry(first);
        project.push_entry(second);

        assert_eq!(
            project.latest_entry().unwrap().status,
            ProjectStatus::Editing
        );
    }

    #[test]
    fn test_status_consistency_detects_drift() {
        let mut project = Project::new("Promo Video", "Acme", "Jo", ProjectStatus::Pending);
        project.push_entry(TimelineEntry::new(
            project.id.clone(),
            ProjectStatus::Review,
            None,
            "Jo",
        ));

        // Bypassing push_entry breaks the invariant.
        project.status = ProjectStatus::Pending;
        assert!(!project.status_is_consistent());
    }

    #[test]
    fn test_draft_defaults_to_pending() {
        let draft = ProjectDraft::new("Promo Video", "Acme", "Jo");
        assert_eq!(draft.status, ProjectStatus::Pending);
    }

    #[test]
    fn test_draft_with_status() {
        let draft = ProjectDraft::new("Promo Video", "Acme", "Jo")
            .with_status(ProjectStatus::Editing);
        assert_eq!(draft.status, ProjectStatus::Editing);
    }

    #[test]
    fn test_entry_comment_skipped_when_absent() {
        let entry = TimelineEntry::new("proj-1", ProjectStatus::Pending, None, "System");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("comment"));
    }

    #[test]
    fn test_project_serialization_roundtrip() {
        let mut project = Project::new("Promo Video", "Acme", "Jo", ProjectStatus::Pending);
        project.push_entry(TimelineEntry::new(
            project.id.clone(),
            ProjectStatus::Editing,
            Some("v1 uploaded".to_string()),
            "Jo",
        ));

        let json = serde_json::to_string(&project).unwrap();
        let deserialized: Project = serde_json::from_str(&json).unwrap();

        assert_eq!(project.id, deserialized.id);
        assert_eq!(project.title, deserialized.title);
        assert_eq!(project.status, deserialized.status);
        assert_eq!(project.timeline.len(), deserialized.timeline.len());
        assert_eq!(
            project.timeline[0].comment,
            deserialized.timeline[0].comment
        );
    }

    #[test]
    fn test_timeline_defaults_to_empty_on_deserialize() {
        // Rows fetched from the projects collection carry no timeline.
        let json = serde_json::json!({
            "id": "proj-1",
            "title": "Promo Video",
            "client_name": "Acme",
            "assigned_editor": "Jo",
            "status": "Pending",
            "created_at": Utc::now(),
        });

        let project: Project = serde_json::from_value(json).unwrap();
        assert!(project.timeline.is_empty());
    }
}
