use crate::analyzer::ContextAnalyzer;
use crate::diff::{diff_contexts, is_significant};
use crate::store::FileSnapshotStore;
use chrono::Utc;
use contextgraph_core::{
    CommitInfo, ContextChange, ContextDiff, ContextGraphConfig, ContextGraphError,
    ContextSnapshot, ContextVersion, DomainContext, Operation, Result, SnapshotStore, StageExt,
    VersionControl,
};
use contextgraph_git::{GitRepository, HistoryOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Timestamp-based version ids, used when no revision is available.
const TIMESTAMP_VERSION_FORMAT: &str = "%Y%m%d%H%M%S%3f";

/// Result of one tracking invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackOutcome {
    /// Version of the persisted snapshot, if one was written.
    pub version: Option<String>,
    pub changes: Vec<ContextChange>,
    pub significant: bool,
    /// True when this call established the baseline.
    pub baseline: bool,
}

/// Keeps a versioned history of captures for one tree.
///
/// The store offers no exclusion between concurrent trackers; callers that
/// track the same tree from several processes must serialize them.
pub struct ContextTracker {
    root: PathBuf,
    analyzer: ContextAnalyzer,
    store: Arc<dyn SnapshotStore>,
    vcs: Option<Arc<dyn VersionControl>>,
}

impl ContextTracker {
    pub fn new(root: impl Into<PathBuf>, analyzer: ContextAnalyzer, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            root: root.into(),
            analyzer,
            store,
            vcs: None,
        }
    }

    pub fn with_version_control(mut self, vcs: Arc<dyn VersionControl>) -> Self {
        self.vcs = Some(vcs);
        self
    }

    /// File-backed tracker for `root`; git provenance is attached when
    /// enabled and the tree lives in a repository.
    pub fn open(root: &Path, config: &ContextGraphConfig) -> Self {
        let store = Arc::new(FileSnapshotStore::new(config.store_path(root)));
        let tracker = Self::new(root, ContextAnalyzer::new(config.extraction.clone()), store);
        if !config.tracking.vcs_enrichment {
            return tracker;
        }
        match GitRepository::open(root) {
            Ok(repo) => tracker.with_version_control(Arc::new(repo.with_options(HistoryOptions {
                max_commits: config.tracking.max_history_commits,
            }))),
            Err(e) => {
                debug!("Tracking without version control: {}", e);
                tracker
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    /// Captures the tree and compares it with the latest persisted capture.
    ///
    /// The first call persists a baseline and reports no changes. Later
    /// calls persist a new snapshot only when the change set is significant.
    pub fn track(&self) -> Result<TrackOutcome> {
        let current = self.analyzer.capture(&self.root)?;
        let previous = self.store.load_latest().stage(Operation::Persist)?;

        let Some(previous) = previous else {
            let version = self.persist(current, Vec::new())?;
            info!("Baseline established at version {}", version);
            return Ok(TrackOutcome {
                version: Some(version),
                changes: Vec::new(),
                significant: false,
                baseline: true,
            });
        };

        let mut changes = diff_contexts(&previous, &current);
        self.enrich(&mut changes);
        let significant = is_significant(&changes);
        info!(
            "Detected {} changes ({})",
            changes.len(),
            if significant { "significant" } else { "not significant" }
        );

        let version = if significant {
            Some(self.persist(current, changes.clone())?)
        } else {
            None
        };
        Ok(TrackOutcome {
            version,
            changes,
            significant,
            baseline: false,
        })
    }

    /// Persisted versions, oldest first.
    pub fn history(&self) -> Result<Vec<ContextVersion>> {
        let snapshots = self.store.list().stage(Operation::Persist)?;
        Ok(snapshots.iter().map(ContextVersion::from).collect())
    }

    /// Structural diff between two persisted snapshots.
    pub fn get_diff(&self, from: &str, to: &str) -> Result<ContextDiff> {
        let before = self.snapshot(from)?;
        let after = self.snapshot(to)?;
        Ok(ContextDiff {
            from: from.to_string(),
            to: to.to_string(),
            changes: diff_contexts(&before.context, &after.context),
        })
    }

    fn snapshot(&self, version: &str) -> Result<ContextSnapshot> {
        self.store
            .load_by_version(version)
            .stage(Operation::Diff)?
            .ok_or_else(|| ContextGraphError::VersionNotFound(version.to_string()))
    }

    fn persist(&self, context: DomainContext, changes: Vec<ContextChange>) -> Result<String> {
        let version = self.next_version().stage(Operation::Persist)?;
        let snapshot = ContextSnapshot {
            context,
            changes,
            version: version.clone(),
            timestamp: Utc::now(),
        };
        self.store.save(&snapshot).stage(Operation::Persist)?;
        Ok(version)
    }

    /// Short revision when available, else a timestamp; suffixed `-2`, `-3`...
    /// while the id is taken.
    fn next_version(&self) -> Result<String> {
        let base = self
            .vcs
            .as_ref()
            .and_then(|vcs| vcs.current_revision())
            .unwrap_or_else(|| Utc::now().format(TIMESTAMP_VERSION_FORMAT).to_string());

        if !self.store.contains_version(&base)? {
            return Ok(base);
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}-{}", base, n);
            if !self.store.contains_version(&candidate)? {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    /// Best effort: changes whose file has no commit keep `vcs` empty.
    fn enrich(&self, changes: &mut [ContextChange]) {
        let Some(vcs) = &self.vcs else {
            return;
        };
        let mut cache: HashMap<String, Option<CommitInfo>> = HashMap::new();
        for change in changes.iter_mut() {
            let Some(file) = &change.file else {
                continue;
            };
            let info = cache
                .entry(file.clone())
                .or_insert_with(|| vcs.last_commit_for(file))
                .clone();
            change.vcs = info;
        }
    }
}
