use crate::{CommitInfo, ContextSnapshot, DomainContext, Result};

/// Append-only log of persisted snapshots plus a pointer to the latest capture.
///
/// Implementations provide no cross-process exclusion: two trackers running
/// against the same store can both read one baseline and both append.
pub trait SnapshotStore: Send + Sync {
    fn load_latest(&self) -> Result<Option<DomainContext>>;

    /// Appends `snapshot` and makes its context the latest capture.
    fn save(&self, snapshot: &ContextSnapshot) -> Result<()>;

    /// All readable snapshots, oldest first. Unreadable entries are skipped.
    fn list(&self) -> Result<Vec<ContextSnapshot>>;

    fn load_by_version(&self, version: &str) -> Result<Option<ContextSnapshot>>;

    fn contains_version(&self, version: &str) -> Result<bool> {
        Ok(self.load_by_version(version)?.is_some())
    }
}

/// Read-only provenance queries. Every failure is reported as `None`.
pub trait VersionControl: Send + Sync {
    fn last_commit_for(&self, path: &str) -> Option<CommitInfo>;

    /// Short form of the current revision id.
    fn current_revision(&self) -> Option<String>;
}
