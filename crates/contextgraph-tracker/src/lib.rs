//! Context Change Tracker: versioned captures of a tree and structural
//! diffs between them.

pub mod analyzer;
pub mod diff;
pub mod store;
pub mod tracker;

pub use analyzer::ContextAnalyzer;
pub use diff::{diff_contexts, is_significant};
pub use store::{FileSnapshotStore, MemorySnapshotStore};
pub use tracker::{ContextTracker, TrackOutcome};
