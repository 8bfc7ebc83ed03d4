use contextgraph_core::{ContextGraphError, ExtractionConfig, Result};
use ignore::{overrides::OverrideBuilder, WalkBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directories that never hold hand-written sources.
const DEFAULT_EXCLUDES: [&str; 8] = [
    "**/node_modules",
    "**/.git",
    "**/dist",
    "**/build",
    "**/coverage",
    "**/.next",
    "**/out",
    "**/.contextgraph",
];

/// Suffixes of declaration-only and generated files.
const SKIPPED_SUFFIXES: [&str; 5] = [".d.ts", ".d.mts", ".d.cts", ".generated.ts", ".gen.ts"];

/// Collects recognized source files under `dir`, sorted by path.
pub fn collect_source_files(dir: &Path, config: &ExtractionConfig) -> Result<Vec<PathBuf>> {
    info!("Collecting source files from: {:?}", dir);

    let mut ovr = OverrideBuilder::new(dir);
    // Override globs whitelist by default; a leading `!` turns them into ignores.
    for exclude in DEFAULT_EXCLUDES
        .iter()
        .map(|s| s.to_string())
        .chain(config.exclude_patterns.iter().cloned())
    {
        let pattern = if exclude.starts_with('!') {
            exclude
        } else {
            format!("!{}", exclude)
        };
        if let Err(e) = ovr.add(&pattern) {
            warn!("Invalid exclude pattern {}: {}", pattern, e);
        }
    }

    let overrides = ovr
        .build()
        .map_err(|e| ContextGraphError::Io(std::io::Error::other(e)))?;

    let walker = WalkBuilder::new(dir)
        .hidden(false)
        .git_ignore(true)
        .git_exclude(true)
        .ignore(true)
        .overrides(overrides)
        .build();

    let mut paths = Vec::new();
    let mut total_files = 0;

    for dent in walker {
        let dent = match dent {
            Ok(d) => d,
            Err(e) => {
                warn!("Walker error: {}", e);
                continue;
            }
        };

        let path = dent.path();
        if !path.is_file() {
            continue;
        }
        total_files += 1;

        if is_recognized(path, &config.extensions) {
            paths.push(path.to_path_buf());
        }
    }

    paths.sort();
    info!(
        "File collection complete: {} files found, {} recognized sources",
        total_files,
        paths.len()
    );
    debug!("Recognized extensions: {:?}", config.extensions);

    Ok(paths)
}

fn is_recognized(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if SKIPPED_SUFFIXES.iter().any(|s| name.ends_with(s)) {
        return false;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|e| e == ext))
        .unwrap_or(false)
}

/// Root-relative id with `/` separators.
pub fn relative_id(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, "export {};\n").unwrap();
    }

    #[test]
    fn skips_declarations_generated_and_vendor_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "src/a.ts");
        touch(root, "src/b.tsx");
        touch(root, "src/types.d.ts");
        touch(root, "src/api.generated.ts");
        touch(root, "src/readme.md");
        touch(root, "node_modules/pkg/index.ts");
        touch(root, "dist/a.ts");
        touch(root, ".contextgraph/x.ts");

        let files = collect_source_files(root, &ExtractionConfig::default()).unwrap();
        let ids: Vec<String> = files.iter().map(|p| relative_id(root, p)).collect();
        assert_eq!(ids, vec!["src/a.ts", "src/b.tsx"]);
    }

    #[test]
    fn honors_custom_excludes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "src/a.ts");
        touch(root, "legacy/old.ts");

        let config = ExtractionConfig {
            exclude_patterns: vec!["legacy/**".to_string()],
            ..ExtractionConfig::default()
        };
        let files = collect_source_files(root, &config).unwrap();
        let ids: Vec<String> = files.iter().map(|p| relative_id(root, p)).collect();
        assert_eq!(ids, vec!["src/a.ts"]);
    }
}
