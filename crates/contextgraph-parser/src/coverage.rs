// ABOUTME: Reads per-file statement coverage from an Istanbul coverage summary
// ABOUTME: Absence or malformed input yields an empty report, never an error

use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct CoverageReport {
    /// Statement coverage keyed by root-relative id.
    statements: HashMap<String, f64>,
}

impl CoverageReport {
    /// Loads `summary_path` (relative to `root` unless absolute).
    pub fn load(root: &Path, summary_path: &str) -> Self {
        let path = root.join(summary_path);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => {
                debug!("No coverage summary at {}", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(value) => Self::from_summary(root, &value),
            Err(e) => {
                warn!("Ignoring unreadable coverage summary {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_summary(root: &Path, summary: &serde_json::Value) -> Self {
        let mut statements = HashMap::new();
        let Some(files) = summary.as_object() else {
            return Self::default();
        };
        let canonical_root = root.canonicalize().ok();

        for (key, entry) in files {
            if key == "total" {
                continue;
            }
            let pct = entry
                .get("statements")
                .and_then(|s| s.get("pct"))
                .and_then(|p| p.as_f64())
                .unwrap_or(0.0);
            if let Some(id) = relative_id(root, canonical_root.as_deref(), key) {
                statements.insert(id, pct);
            }
        }
        debug!("Loaded coverage for {} files", statements.len());
        Self { statements }
    }

    /// Statement coverage percentage for `id`, 0 when not covered by the report.
    pub fn statement_pct(&self, id: &str) -> f64 {
        self.statements.get(id).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

fn relative_id(root: &Path, canonical_root: Option<&Path>, key: &str) -> Option<String> {
    let key_path = Path::new(key);
    let rel = if key_path.is_absolute() {
        key_path
            .strip_prefix(root)
            .ok()
            .or_else(|| canonical_root.and_then(|r| key_path.strip_prefix(r).ok()))?
    } else {
        key_path
    };
    let id = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    Some(id.trim_start_matches("./").to_string())
}
