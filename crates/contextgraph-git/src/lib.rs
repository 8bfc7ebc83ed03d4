//! ContextGraph Git integration: current revision and per-file last-commit
//! lookups using libgit2, exposed through the `VersionControl` trait.

pub mod errors;
pub mod history;
pub mod repo;

pub use errors::{GitIntegrationError, Result};
pub use history::HistoryOptions;
pub use repo::GitRepository;
