// ABOUTME: Directory and file naming conventions used to classify source files
// ABOUTME: Decides entity/service scope, file class, and locates companion test files

use contextgraph_core::{ExtractionConfig, FileClass};
use std::path::Path;

const TEST_MARKERS: [&str; 2] = [".spec.", ".test."];

#[derive(Debug, Clone)]
pub struct Conventions {
    entity_dirs: Vec<String>,
    service_dirs: Vec<String>,
    config_dirs: Vec<String>,
    test_dirs: Vec<String>,
    extensions: Vec<String>,
}

impl Conventions {
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            entity_dirs: config.entity_dirs.clone(),
            service_dirs: config.service_dirs.clone(),
            config_dirs: config.config_dirs.clone(),
            test_dirs: config.test_dirs.clone(),
            extensions: config.extensions.clone(),
        }
    }

    /// Directory segments of a root-relative id, excluding the file name.
    fn dir_segments(id: &str) -> impl Iterator<Item = &str> {
        let mut parts: Vec<&str> = id.split('/').collect();
        parts.pop();
        parts.into_iter()
    }

    fn file_name(id: &str) -> &str {
        id.rsplit('/').next().unwrap_or(id)
    }

    fn under_any(id: &str, dirs: &[String]) -> bool {
        Self::dir_segments(id).any(|seg| dirs.iter().any(|d| d == seg))
    }

    pub fn is_entity_scope(&self, id: &str) -> bool {
        Self::under_any(id, &self.entity_dirs)
    }

    pub fn is_service_scope(&self, id: &str) -> bool {
        Self::under_any(id, &self.service_dirs)
    }

    pub fn is_test_file(&self, id: &str) -> bool {
        let name = Self::file_name(id);
        TEST_MARKERS.iter().any(|m| name.contains(m)) || Self::under_any(id, &self.test_dirs)
    }

    fn is_config_file(&self, id: &str) -> bool {
        let name = Self::file_name(id);
        let stem = name.split('.').next().unwrap_or(name);
        stem == "config" || name.contains(".config.") || Self::under_any(id, &self.config_dirs)
    }

    /// Precedence: test > config > entity > service > util.
    pub fn classify(&self, id: &str) -> FileClass {
        if self.is_test_file(id) {
            FileClass::Test
        } else if self.is_config_file(id) {
            FileClass::Config
        } else if self.is_entity_scope(id) {
            FileClass::Entity
        } else if self.is_service_scope(id) {
            FileClass::Service
        } else {
            FileClass::Util
        }
    }

    /// Looks for `name.spec.ts`/`name.test.ts` beside the file or in a
    /// test directory next to it.
    pub fn has_test_file(&self, root: &Path, id: &str) -> bool {
        let name = Self::file_name(id);
        let stem = match name.rfind('.') {
            Some(idx) => &name[..idx],
            None => name,
        };
        let dir = match id.rfind('/') {
            Some(idx) => root.join(&id[..idx]),
            None => root.to_path_buf(),
        };

        let mut candidate_dirs = vec![dir.clone()];
        candidate_dirs.extend(self.test_dirs.iter().map(|t| dir.join(t)));

        candidate_dirs.iter().any(|d| {
            TEST_MARKERS.iter().any(|marker| {
                self.extensions.iter().any(|ext| {
                    let candidate = format!("{}{}{}", stem, marker, ext);
                    d.join(candidate).is_file()
                })
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conventions() -> Conventions {
        Conventions::from_config(&ExtractionConfig::default())
    }

    #[test]
    fn classifies_by_directory() {
        let c = conventions();
        assert_eq!(c.classify("src/models/user.ts"), FileClass::Entity);
        assert_eq!(c.classify("src/services/user.service.ts"), FileClass::Service);
        assert_eq!(c.classify("src/controllers/user.controller.ts"), FileClass::Service);
        assert_eq!(c.classify("src/lib/strings.ts"), FileClass::Util);
    }

    #[test]
    fn test_and_config_take_precedence() {
        let c = conventions();
        assert_eq!(c.classify("src/services/user.service.spec.ts"), FileClass::Test);
        assert_eq!(c.classify("src/__tests__/user.ts"), FileClass::Test);
        assert_eq!(c.classify("src/config/database.ts"), FileClass::Config);
        assert_eq!(c.classify("jest.config.ts"), FileClass::Config);
        assert_eq!(c.classify("src/models/config.ts"), FileClass::Config);
    }

    #[test]
    fn file_name_is_not_a_directory_segment() {
        let c = conventions();
        assert!(!c.is_entity_scope("src/models.ts"));
        assert!(c.is_entity_scope("models/user.ts"));
    }

    #[test]
    fn finds_sibling_and_colocated_tests() {
        let dir = tempfile::tempdir().unwrap();
        let services = dir.path().join("src/services");
        std::fs::create_dir_all(services.join("__tests__")).unwrap();
        std::fs::write(services.join("a.service.spec.ts"), "").unwrap();
        std::fs::write(services.join("__tests__/b.service.test.ts"), "").unwrap();

        let c = conventions();
        assert!(c.has_test_file(dir.path(), "src/services/a.service.ts"));
        assert!(c.has_test_file(dir.path(), "src/services/b.service.ts"));
        assert!(!c.has_test_file(dir.path(), "src/services/c.service.ts"));
    }
}
