use contextgraph_core::{
    ChangeAction, ChangeType, ContextGraphConfig, ExtractionConfig, Operation, SnapshotStore,
};
use contextgraph_tracker::{
    diff_contexts, ContextAnalyzer, ContextTracker, FileSnapshotStore, MemorySnapshotStore,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

const USER_SERVICE: &str = r#"
import { User } from '../models/user';

@Injectable()
export class UserService {
    find(id: string): User | undefined {
        return undefined;
    }
}
"#;

const AUDIT_SERVICE: &str = r#"
@Injectable()
export class AuditService {
    record(event: string): void {}
}
"#;

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "tsconfig.json", "{}");
    write(root, "src/models/user.ts", "export interface User {\n    id: string;\n}\n");
    write(root, "src/services/user.service.ts", USER_SERVICE);
    dir
}

fn memory_tracker(root: &Path) -> ContextTracker {
    ContextTracker::new(
        root,
        ContextAnalyzer::new(ExtractionConfig::default()),
        Arc::new(MemorySnapshotStore::new()),
    )
}

#[test]
fn first_run_establishes_baseline() {
    let dir = project();
    let tracker = memory_tracker(dir.path());

    let outcome = tracker.track().unwrap();
    assert!(outcome.baseline);
    assert!(outcome.changes.is_empty());
    assert!(outcome.version.is_some());

    let history = tracker.history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].change_count, 0);
    assert!(!history[0].significant);
}

#[test]
fn adding_then_removing_a_service() {
    let dir = project();
    let tracker = memory_tracker(dir.path());
    tracker.track().unwrap();

    write(dir.path(), "src/services/audit.service.ts", AUDIT_SERVICE);
    let added = tracker.track().unwrap();
    assert_eq!(added.changes.len(), 1);
    assert_eq!(added.changes[0].change_type, ChangeType::Service);
    assert_eq!(added.changes[0].action, ChangeAction::Added);
    assert_eq!(added.changes[0].name, "AuditService");
    assert_eq!(
        added.changes[0].file.as_deref(),
        Some("src/services/audit.service.ts")
    );
    assert!(added.significant);
    assert!(added.version.is_some());

    fs::remove_file(dir.path().join("src/services/audit.service.ts")).unwrap();
    let removed = tracker.track().unwrap();
    assert_eq!(removed.changes.len(), 1);
    assert_eq!(removed.changes[0].change_type, ChangeType::Service);
    assert_eq!(removed.changes[0].action, ChangeAction::Removed);
    assert_eq!(tracker.history().unwrap().len(), 3);
}

#[test]
fn unstructural_edit_persists_nothing() {
    let dir = project();
    let tracker = memory_tracker(dir.path());
    tracker.track().unwrap();

    write(
        dir.path(),
        "src/services/user.service.ts",
        &format!("// maintained by the platform team\n{}", USER_SERVICE),
    );
    let outcome = tracker.track().unwrap();
    assert!(outcome.changes.is_empty());
    assert!(!outcome.significant);
    assert!(outcome.version.is_none());
    assert_eq!(tracker.history().unwrap().len(), 1);
}

#[test]
fn entity_modification_is_reported_but_not_persisted() {
    let dir = project();
    let tracker = memory_tracker(dir.path());
    tracker.track().unwrap();

    write(
        dir.path(),
        "src/models/user.ts",
        "export interface User {\n    id: string;\n    email?: string;\n}\n",
    );
    let outcome = tracker.track().unwrap();
    assert_eq!(outcome.changes.len(), 1);
    assert_eq!(outcome.changes[0].action, ChangeAction::Modified);
    assert!(!outcome.significant);
    assert_eq!(tracker.history().unwrap().len(), 1);

    // the baseline stays put, so the change is reported again
    let again = tracker.track().unwrap();
    assert_eq!(again.changes.len(), 1);
}

#[test]
fn get_diff_matches_direct_diff() {
    let dir = project();
    let tracker = memory_tracker(dir.path());
    let v1 = tracker.track().unwrap().version.unwrap();
    write(dir.path(), "src/services/audit.service.ts", AUDIT_SERVICE);
    let v2 = tracker.track().unwrap().version.unwrap();
    assert_ne!(v1, v2);

    let diff = tracker.get_diff(&v1, &v2).unwrap();
    let a = tracker.store().load_by_version(&v1).unwrap().unwrap();
    let b = tracker.store().load_by_version(&v2).unwrap().unwrap();
    assert_eq!(diff.changes, diff_contexts(&a.context, &b.context));
    assert_eq!(diff.from, v1);
    assert_eq!(diff.to, v2);

    let err = tracker.get_diff(&v1, "does-not-exist").unwrap_err();
    assert!(err.is_version_not_found());
    assert_eq!(err.to_string(), "version not found: does-not-exist");
}

#[test]
fn extraction_failure_names_the_stage() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/a.ts", "export const a = 1;");
    let tracker = memory_tracker(dir.path());
    let err = tracker.track().unwrap_err();
    assert_eq!(err.operation(), Some(Operation::Extract));
}

#[test]
fn file_store_history_survives_reopening() {
    let dir = project();
    let mut config = ContextGraphConfig::default();
    config.tracking.vcs_enrichment = false;

    let first = ContextTracker::open(dir.path(), &config);
    first.track().unwrap();
    write(dir.path(), "src/services/audit.service.ts", AUDIT_SERVICE);
    first.track().unwrap();

    let reopened = ContextTracker::open(dir.path(), &config);
    let history = reopened.history().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].change_count, 1);
    assert!(history[1].significant);

    let store = FileSnapshotStore::new(config.store_path(dir.path()));
    assert!(store.load_latest().unwrap().unwrap().service("AuditService").is_some());

    // a corrupted snapshot does not break the listing
    fs::write(
        config.store_path(dir.path()).join("snapshots/broken.json"),
        "not json",
    )
    .unwrap();
    assert_eq!(reopened.history().unwrap().len(), 2);
}

#[test]
fn same_named_services_in_different_modules_are_stable() {
    let dir = project();
    write(
        dir.path(),
        "src/users/services/app.service.ts",
        "@Injectable()\nexport class AppService {\n    find(id: string): void {}\n}\n",
    );
    write(
        dir.path(),
        "src/orders/services/app.service.ts",
        "@Injectable()\nexport class AppService {\n    list(): void {}\n}\n",
    );
    let tracker = memory_tracker(dir.path());
    tracker.track().unwrap();

    let rerun = tracker.track().unwrap();
    assert!(rerun.changes.is_empty());
    assert!(!rerun.significant);
    assert_eq!(tracker.history().unwrap().len(), 1);
}
