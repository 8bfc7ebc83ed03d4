// ABOUTME: Resolves module specifiers to in-tree file ids
// ABOUTME: Relative specifiers are normalized; package specifiers stay opaque

use std::collections::HashSet;

const CANDIDATE_SUFFIXES: [&str; 5] = ["", ".ts", ".tsx", "/index.ts", "/index.tsx"];

#[derive(Debug, Clone, Default)]
pub struct ImportResolver {
    known: HashSet<String>,
}

impl ImportResolver {
    pub fn new(known: impl IntoIterator<Item = String>) -> Self {
        Self {
            known: known.into_iter().collect(),
        }
    }

    pub fn is_relative(specifier: &str) -> bool {
        specifier == "." || specifier == ".." || specifier.starts_with("./") || specifier.starts_with("../")
    }

    /// Target id for `specifier` imported from the file `from_id`.
    ///
    /// Relative specifiers that match no collected file keep their normalized
    /// form, so the edge target dangles rather than disappearing.
    pub fn resolve(&self, from_id: &str, specifier: &str) -> String {
        if !Self::is_relative(specifier) {
            return specifier.to_string();
        }

        let base_dir = match from_id.rfind('/') {
            Some(idx) => &from_id[..idx],
            None => "",
        };
        let joined = if base_dir.is_empty() {
            specifier.to_string()
        } else {
            format!("{}/{}", base_dir, specifier)
        };
        let normalized = normalize(&joined);

        let stripped = strip_js_extension(&normalized);
        for base in [normalized.as_str(), stripped] {
            for suffix in CANDIDATE_SUFFIXES {
                let candidate = format!("{}{}", base, suffix);
                if self.known.contains(&candidate) {
                    return candidate;
                }
            }
        }
        normalized
    }
}

/// `import './a.js'` is how ESM TypeScript refers to `a.ts`.
fn strip_js_extension(path: &str) -> &str {
    path.strip_suffix(".js")
        .or_else(|| path.strip_suffix(".jsx"))
        .unwrap_or(path)
}

/// Collapses `.` and `..` segments. Leading `..` past the root are kept.
pub fn normalize(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                if matches!(out.last(), Some(last) if *last != "..") {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out.join("/")
}
