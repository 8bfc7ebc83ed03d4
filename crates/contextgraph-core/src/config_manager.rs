use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration for ContextGraph
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ContextGraphConfig {
    /// Source tree walking and parsing conventions
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Snapshot store and provenance settings
    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionConfig {
    /// File that must exist at the tree root for extraction to proceed
    #[serde(default = "default_project_config")]
    pub project_config: String,

    /// Recognized source extensions, without the dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Glob patterns excluded on top of the built-in ones
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    #[serde(default = "default_entity_dirs")]
    pub entity_dirs: Vec<String>,

    #[serde(default = "default_service_dirs")]
    pub service_dirs: Vec<String>,

    #[serde(default = "default_config_dirs")]
    pub config_dirs: Vec<String>,

    #[serde(default = "default_test_dirs")]
    pub test_dirs: Vec<String>,

    /// Decorators that mark a class as an injectable service
    #[serde(default = "default_injectable_decorators")]
    pub injectable_decorators: Vec<String>,

    /// Istanbul `coverage-summary.json`, relative to the tree root
    #[serde(default = "default_coverage_summary")]
    pub coverage_summary: String,

    /// Parse files on the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            project_config: default_project_config(),
            extensions: default_extensions(),
            exclude_patterns: Vec::new(),
            entity_dirs: default_entity_dirs(),
            service_dirs: default_service_dirs(),
            config_dirs: default_config_dirs(),
            test_dirs: default_test_dirs(),
            injectable_decorators: default_injectable_decorators(),
            coverage_summary: default_coverage_summary(),
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackingConfig {
    /// Store directory, relative to the tree root unless absolute
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Attach last-commit provenance to each change
    #[serde(default = "default_true")]
    pub vcs_enrichment: bool,

    /// Upper bound on commits walked when looking up a file's last commit
    #[serde(default = "default_max_history_commits")]
    pub max_history_commits: usize,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            vcs_enrichment: true,
            max_history_commits: default_max_history_commits(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// "text" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_project_config() -> String {
    "tsconfig.json".to_string()
}
fn default_extensions() -> Vec<String> {
    vec!["ts".to_string(), "tsx".to_string()]
}
fn default_entity_dirs() -> Vec<String> {
    ["types", "interfaces", "models", "entities"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_service_dirs() -> Vec<String> {
    ["services", "providers", "controllers"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_config_dirs() -> Vec<String> {
    vec!["config".to_string(), "configs".to_string()]
}
fn default_test_dirs() -> Vec<String> {
    ["__tests__", "test", "tests"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_injectable_decorators() -> Vec<String> {
    vec!["Injectable".to_string()]
}
fn default_coverage_summary() -> String {
    "coverage/coverage-summary.json".to_string()
}
fn default_store_dir() -> String {
    ".contextgraph".to_string()
}
fn default_max_history_commits() -> usize {
    10_000
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

impl ContextGraphConfig {
    /// Resolved snapshot store directory for a tree rooted at `root`.
    pub fn store_path(&self, root: &Path) -> PathBuf {
        let dir = Path::new(&self.tracking.store_dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            root.join(dir)
        }
    }
}

/// Configuration manager with layered sources
pub struct ConfigManager {
    config: ContextGraphConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration for the tree at `root` with the following precedence:
    /// 1. Environment variables (`CONTEXTGRAPH_*`, `RUST_LOG`, `./.env` or `~/.contextgraph.env`)
    /// 2. `<root>/.contextgraph.toml`
    /// 3. `~/.contextgraph/config.toml`
    /// 4. Defaults
    ///
    /// The analyzed tree's own `.env` is never read.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        Self::load_dotenv();
        let (config, config_path) = Self::load_config_file(root)?;
        Self::finish(config, config_path)
    }

    /// Load an explicit config file, still applying environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_toml_file(path)?;
        Self::finish(config, Some(path.to_path_buf()))
    }

    fn finish(
        config: ContextGraphConfig,
        config_path: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let config = Self::apply_env_overrides(config);
        Self::validate_config(&config)?;

        match config_path {
            Some(ref path) => info!("Config file: {}", path.display()),
            None => info!("No config file found, using defaults"),
        }
        debug!(
            "Extraction: project_config={}, extensions={:?}, parallel={}",
            config.extraction.project_config,
            config.extraction.extensions,
            config.extraction.parallel
        );

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Load `.env` from the working directory, else `~/.contextgraph.env`
    fn load_dotenv() {
        if Path::new(".env").exists() {
            match dotenv::from_filename(".env") {
                Ok(_) => debug!("Loaded .env file from current directory"),
                Err(e) => warn!("Failed to load .env file: {}", e),
            }
            return;
        }

        if let Some(home) = dirs::home_dir() {
            let home_env = home.join(".contextgraph.env");
            if home_env.exists() {
                match dotenv::from_path(&home_env) {
                    Ok(_) => debug!("Loaded .contextgraph.env from home directory"),
                    Err(e) => warn!("Failed to load .contextgraph.env: {}", e),
                }
            }
        }
    }

    fn load_config_file(root: &Path) -> Result<(ContextGraphConfig, Option<PathBuf>), ConfigError> {
        let local_config = root.join(".contextgraph.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(&local_config)?;
            return Ok((config, Some(local_config)));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".contextgraph").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        Ok((ContextGraphConfig::default(), None))
    }

    fn read_toml_file(path: &Path) -> Result<ContextGraphConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn apply_env_overrides(mut config: ContextGraphConfig) -> ContextGraphConfig {
        if let Ok(file) = std::env::var("CONTEXTGRAPH_PROJECT_CONFIG") {
            config.extraction.project_config = file;
        }
        if let Ok(path) = std::env::var("CONTEXTGRAPH_COVERAGE_SUMMARY") {
            config.extraction.coverage_summary = path;
        }
        if let Ok(parallel) = std::env::var("CONTEXTGRAPH_PARALLEL") {
            config.extraction.parallel = parallel.to_lowercase() == "true" || parallel == "1";
        }
        if let Ok(dir) = std::env::var("CONTEXTGRAPH_STORE_DIR") {
            config.tracking.store_dir = dir;
        }
        if let Ok(enrich) = std::env::var("CONTEXTGRAPH_VCS_ENRICHMENT") {
            config.tracking.vcs_enrichment = enrich.to_lowercase() == "true" || enrich == "1";
        }
        if let Ok(format) = std::env::var("CONTEXTGRAPH_LOG_FORMAT") {
            config.logging.format = format;
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            // Filter directives are handed to EnvFilter directly; only plain levels land here.
            let level = level.to_lowercase();
            if matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
                config.logging.level = level;
            }
        }
        config
    }

    fn validate_config(config: &ContextGraphConfig) -> Result<(), ConfigError> {
        match config.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    other
                )))
            }
        }

        match config.logging.format.as_str() {
            "text" | "json" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {}. Must be one of: text, json",
                    other
                )))
            }
        }

        if config.extraction.extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "extraction.extensions must not be empty".to_string(),
            ));
        }

        if config.extraction.project_config.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "extraction.project_config must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn config(&self) -> &ContextGraphConfig {
        &self.config
    }

    pub fn into_config(self) -> ContextGraphConfig {
        self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Write the default configuration to `path`.
    pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let config = ContextGraphConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        }

        std::fs::write(path, toml_str).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Ok(())
    }
}
