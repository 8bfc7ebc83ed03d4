use crate::{DependencyGraph, EntityDefinition, ServiceDefinition, SourceFile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw output of one extraction pass, before graph metrics are derived.
#[derive(Debug, Clone, Default)]
pub struct SourceModel {
    pub root: PathBuf,
    pub entities: Vec<EntityDefinition>,
    pub services: Vec<ServiceDefinition>,
    pub files: Vec<SourceFile>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetrics {
    pub total_files: usize,
    pub total_dependencies: usize,
    pub average_dependencies: f64,
    pub max_dependencies: usize,
    pub dependency_cohesion: f64,
    pub dependency_stability: f64,
}

/// File complexity buckets: low <= 5 < medium <= 10 < high.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComplexityDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub average: f64,
    pub max: u32,
}

impl ComplexityDistribution {
    pub const LOW_MAX: u32 = 5;
    pub const MEDIUM_MAX: u32 = 10;

    pub fn from_values(values: impl IntoIterator<Item = u32>) -> Self {
        let mut dist = Self::default();
        let mut total = 0u64;
        let mut count = 0usize;
        for v in values {
            match v {
                v if v <= Self::LOW_MAX => dist.low += 1,
                v if v <= Self::MEDIUM_MAX => dist.medium += 1,
                _ => dist.high += 1,
            }
            dist.max = dist.max.max(v);
            total += u64::from(v);
            count += 1;
        }
        if count > 0 {
            dist.average = total as f64 / count as f64;
        }
        dist
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMetadata {
    pub total_entities: usize,
    pub total_services: usize,
    pub total_files: usize,
    pub total_dependencies: usize,
    pub complexity: ComplexityDistribution,
    /// Mean statement coverage across services.
    pub coverage: f64,
    pub graph: GraphMetrics,
}

/// One immutable whole-tree capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainContext {
    pub entities: Vec<EntityDefinition>,
    pub services: Vec<ServiceDefinition>,
    pub graph: DependencyGraph,
    pub metadata: ContextMetadata,
    pub timestamp: DateTime<Utc>,
}

impl DomainContext {
    /// Equality ignoring the capture timestamp.
    pub fn same_structure(&self, other: &DomainContext) -> bool {
        self.entities == other.entities
            && self.services == other.services
            && self.graph == other.graph
            && self.metadata == other.metadata
    }

    pub fn entity(&self, name: &str) -> Option<&EntityDefinition> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn service(&self, name: &str) -> Option<&ServiceDefinition> {
        self.services.iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
    pub files: Vec<String>,
    pub cohesion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircularDependency {
    /// Members in traversal order; the last one depends on the first.
    pub files: Vec<String>,
    pub length: usize,
    pub impact: f64,
}

/// Result of one dependency analysis run, handed to downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyAnalysis {
    pub graph: DependencyGraph,
    pub circular_dependencies: Vec<CircularDependency>,
    pub metrics: GraphMetrics,
    pub clusters: Vec<Cluster>,
    pub timestamp: DateTime<Utc>,
}
