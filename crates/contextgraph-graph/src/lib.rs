//! Dependency Graph Builder & Metrics, Cycle Detector and Cluster Identifier.
//!
//! Everything here is a pure function of an extracted [`SourceModel`] or a
//! [`DependencyGraph`]; nothing touches the file system.
//!
//! [`SourceModel`]: contextgraph_core::SourceModel
//! [`DependencyGraph`]: contextgraph_core::DependencyGraph

pub mod builder;
pub mod clusters;
pub mod context;
pub mod cycles;
pub mod metrics;

pub use builder::build_graph;
pub use clusters::identify_clusters;
pub use context::{analyze_dependencies, build_context};
pub use cycles::detect_cycles;
pub use metrics::{graph_metrics, pair_cohesion};
