use contextgraph_core::{ContextGraphError, ContextSnapshot, DomainContext, Result, SnapshotStore};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const LATEST_FILE: &str = "latest.json";
const SNAPSHOTS_DIR: &str = "snapshots";

/// Snapshot log on disk:
///
/// ```text
/// <dir>/latest.json               latest capture
/// <dir>/snapshots/<version>.json  one file per persisted snapshot
/// ```
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn latest_path(&self) -> PathBuf {
        self.dir.join(LATEST_FILE)
    }

    fn snapshots_dir(&self) -> PathBuf {
        self.dir.join(SNAPSHOTS_DIR)
    }

    /// `None` for ids that cannot be a plain file name.
    fn snapshot_path(&self, version: &str) -> Option<PathBuf> {
        let valid = !version.is_empty()
            && !version.starts_with('.')
            && !version.contains(['/', '\\']);
        valid.then(|| self.snapshots_dir().join(format!("{}.json", version)))
    }

    fn read_snapshot(path: &Path) -> Result<ContextSnapshot> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Writes through a sibling temp file so readers never see half a document.
fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_vec_pretty(value)?;
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

impl SnapshotStore for FileSnapshotStore {
    fn load_latest(&self) -> Result<Option<DomainContext>> {
        let path = self.latest_path();
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn save(&self, snapshot: &ContextSnapshot) -> Result<()> {
        let Some(path) = self.snapshot_path(&snapshot.version) else {
            return Err(ContextGraphError::InvalidVersion(snapshot.version.clone()));
        };
        fs::create_dir_all(self.snapshots_dir())?;
        write_json(&path, snapshot)?;
        write_json(&self.latest_path(), &snapshot.context)?;
        debug!("Saved snapshot {} to {:?}", snapshot.version, path);
        Ok(())
    }

    fn list(&self) -> Result<Vec<ContextSnapshot>> {
        let dir = self.snapshots_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut snapshots = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = match entry {
                Ok(e) => e.path(),
                Err(e) => {
                    warn!("Unreadable entry in {:?}: {}", dir, e);
                    continue;
                }
            };
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_snapshot(&path) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => warn!("Skipping corrupted snapshot {:?}: {}", path, e),
            }
        }
        snapshots.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.version.cmp(&b.version))
        });
        Ok(snapshots)
    }

    fn load_by_version(&self, version: &str) -> Result<Option<ContextSnapshot>> {
        match self.snapshot_path(version) {
            Some(path) if path.is_file() => Ok(Some(Self::read_snapshot(&path)?)),
            _ => Ok(None),
        }
    }

    fn contains_version(&self, version: &str) -> Result<bool> {
        Ok(self.snapshot_path(version).is_some_and(|p| p.is_file()))
    }
}

#[derive(Default)]
struct MemoryState {
    latest: Option<DomainContext>,
    snapshots: Vec<ContextSnapshot>,
}

/// In-process store for embedding and tests.
#[derive(Default)]
pub struct MemorySnapshotStore {
    state: Mutex<MemoryState>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load_latest(&self) -> Result<Option<DomainContext>> {
        Ok(self.state.lock().latest.clone())
    }

    fn save(&self, snapshot: &ContextSnapshot) -> Result<()> {
        let mut state = self.state.lock();
        state.latest = Some(snapshot.context.clone());
        state.snapshots.push(snapshot.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<ContextSnapshot>> {
        Ok(self.state.lock().snapshots.clone())
    }

    fn load_by_version(&self, version: &str) -> Result<Option<ContextSnapshot>> {
        Ok(self
            .state
            .lock()
            .snapshots
            .iter()
            .find(|s| s.version == version)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use contextgraph_core::DependencyGraph;
    use tempfile::TempDir;

    fn snapshot(version: &str, offset_secs: i64) -> ContextSnapshot {
        let timestamp = Utc::now() + Duration::seconds(offset_secs);
        ContextSnapshot {
            context: DomainContext {
                entities: Vec::new(),
                services: Vec::new(),
                graph: DependencyGraph::default(),
                metadata: Default::default(),
                timestamp,
            },
            changes: Vec::new(),
            version: version.to_string(),
            timestamp,
        }
    }

    #[test]
    fn file_store_round_trip_and_latest_pointer() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join(".contextgraph"));
        assert!(store.load_latest().unwrap().is_none());
        assert!(store.list().unwrap().is_empty());

        let first = snapshot("v1", 0);
        let second = snapshot("v2", 5);
        store.save(&first).unwrap();
        store.save(&second).unwrap();

        assert_eq!(store.load_latest().unwrap(), Some(second.context.clone()));
        let versions: Vec<String> = store.list().unwrap().into_iter().map(|s| s.version).collect();
        assert_eq!(versions, vec!["v1", "v2"]);
        assert_eq!(store.load_by_version("v1").unwrap(), Some(first));
        assert!(store.contains_version("v2").unwrap());
        assert!(store.load_by_version("v3").unwrap().is_none());
        assert!(store.load_by_version("../latest").unwrap().is_none());
    }

    #[test]
    fn unusable_version_ids_are_rejected_on_save() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        for version in ["", ".hidden", "../escape", "a\\b"] {
            let err = store.save(&snapshot(version, 0)).unwrap_err();
            assert!(
                matches!(&err, ContextGraphError::InvalidVersion(v) if v == version),
                "{:?}",
                err
            );
        }
        assert!(store.load_latest().unwrap().is_none());
    }

    #[test]
    fn corrupted_snapshots_are_skipped_when_listing() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        store.save(&snapshot("good", 0)).unwrap();
        fs::write(dir.path().join("snapshots/bad.json"), b"{ not json").unwrap();
        fs::write(dir.path().join("snapshots/notes.txt"), b"ignored").unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].version, "good");
        assert!(store.load_by_version("bad").is_err());
    }

    #[test]
    fn memory_store_behaves_like_a_log() {
        let store = MemorySnapshotStore::new();
        assert!(store.load_latest().unwrap().is_none());
        store.save(&snapshot("a", 0)).unwrap();
        store.save(&snapshot("b", 1)).unwrap();
        assert_eq!(store.list().unwrap().len(), 2);
        assert!(store.contains_version("a").unwrap());
        assert!(!store.contains_version("c").unwrap());
        assert_eq!(
            store.load_latest().unwrap(),
            Some(snapshot_context(&store, "b"))
        );
    }

    fn snapshot_context(store: &MemorySnapshotStore, version: &str) -> DomainContext {
        store.load_by_version(version).unwrap().unwrap().context
    }
}
