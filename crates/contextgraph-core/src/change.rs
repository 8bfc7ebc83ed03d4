use crate::DomainContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Entity,
    Service,
    Dependency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Added,
    Modified,
    Removed,
    DependenciesChanged,
    MethodAdded,
    MethodModified,
    MethodRemoved,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChangeDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,
}

/// Last commit that touched a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub revision: String,
    pub author: String,
    pub email: String,
    pub timestamp: DateTime<Utc>,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextChange {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub action: ChangeAction,
    pub name: String,
    pub file: Option<String>,
    pub detail: ChangeDetail,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcs: Option<CommitInfo>,
}

impl ContextChange {
    pub fn new(change_type: ChangeType, action: ChangeAction, name: impl Into<String>) -> Self {
        Self {
            change_type,
            action,
            name: name.into(),
            file: None,
            detail: ChangeDetail::default(),
            vcs: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_before(mut self, before: serde_json::Value) -> Self {
        self.detail.before = Some(before);
        self
    }

    pub fn with_after(mut self, after: serde_json::Value) -> Self {
        self.detail.after = Some(after);
        self
    }

    /// Whether this change alone makes a change set worth persisting.
    pub fn is_significant(&self) -> bool {
        match (self.change_type, self.action) {
            (_, ChangeAction::Added | ChangeAction::Removed) => true,
            (ChangeType::Service, _) => true,
            _ => false,
        }
    }
}

/// A persisted, versioned capture together with the changes that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub context: DomainContext,
    pub changes: Vec<ContextChange>,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// History listing entry for one persisted snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextVersion {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub change_count: usize,
    pub significant: bool,
}

impl From<&ContextSnapshot> for ContextVersion {
    fn from(snapshot: &ContextSnapshot) -> Self {
        Self {
            version: snapshot.version.clone(),
            timestamp: snapshot.timestamp,
            change_count: snapshot.changes.len(),
            significant: snapshot.changes.iter().any(ContextChange::is_significant),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextDiff {
    pub from: String,
    pub to: String,
    pub changes: Vec<ContextChange>,
}
