use crate::{build_graph, detect_cycles, graph_metrics, identify_clusters};
use chrono::Utc;
use contextgraph_core::{
    ComplexityDistribution, ContextMetadata, DependencyAnalysis, DependencyGraph, DomainContext,
    SourceModel,
};
use tracing::info;

/// Assembles one immutable capture from an extraction pass.
pub fn build_context(model: &SourceModel) -> DomainContext {
    let graph = build_graph(&model.files);
    let metrics = graph_metrics(&graph);

    let coverage = if model.services.is_empty() {
        0.0
    } else {
        model
            .services
            .iter()
            .map(|s| s.metadata.metrics.coverage)
            .sum::<f64>()
            / model.services.len() as f64
    };

    let metadata = ContextMetadata {
        total_entities: model.entities.len(),
        total_services: model.services.len(),
        total_files: metrics.total_files,
        total_dependencies: metrics.total_dependencies,
        complexity: ComplexityDistribution::from_values(graph.nodes.iter().map(|n| n.complexity)),
        coverage,
        graph: metrics,
    };

    info!(
        "Built context: {} entities, {} services, {} files, {} dependencies",
        metadata.total_entities,
        metadata.total_services,
        metadata.total_files,
        metadata.total_dependencies
    );

    DomainContext {
        entities: model.entities.clone(),
        services: model.services.clone(),
        graph,
        metadata,
        timestamp: Utc::now(),
    }
}

/// Cycles and clusters over one graph; the two walks run side by side.
pub fn analyze_dependencies(graph: &DependencyGraph) -> DependencyAnalysis {
    let (circular_dependencies, clusters) =
        rayon::join(|| detect_cycles(graph), || identify_clusters(graph));
    let metrics = graph_metrics(graph);

    info!(
        "Dependency analysis: {} cycles, {} clusters over {} files",
        circular_dependencies.len(),
        clusters.len(),
        metrics.total_files
    );

    DependencyAnalysis {
        graph: graph.clone(),
        circular_dependencies,
        metrics,
        clusters,
        timestamp: Utc::now(),
    }
}
