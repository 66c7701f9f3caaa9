//! Reference-name kinds.
//!
//! Clients and editors are tracked as deduplicated name lists, unique
//! per owning user. The kind selects which list (and which remote
//! collection) a name belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which reference list a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// A client display name.
    Client,
    /// An editor display name.
    Editor,
}

impl ReferenceKind {
    /// Remote collection backing this kind.
    pub fn collection(&self) -> &'static str {
        match self {
            ReferenceKind::Client => "clients",
            ReferenceKind::Editor => "editors",
        }
    }

    /// Human label for notifications.
    pub fn label(&self) -> &'static str {
        match self {
            ReferenceKind::Client => "client",
            ReferenceKind::Editor => "editor",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
