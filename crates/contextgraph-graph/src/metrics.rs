use contextgraph_core::{DependencyGraph, DependencyGraphEdge, GraphMetrics};
use std::collections::{HashMap, HashSet};

pub fn graph_metrics(graph: &DependencyGraph) -> GraphMetrics {
    let total_files = graph.nodes.len();
    let total_dependencies = graph.edges.len();

    let mut out_degree: HashMap<&str, usize> = HashMap::new();
    for edge in &graph.edges {
        *out_degree.entry(edge.source.as_str()).or_default() += 1;
    }
    let max_dependencies = out_degree.values().copied().max().unwrap_or(0);

    let average_dependencies = if total_files == 0 {
        0.0
    } else {
        total_dependencies as f64 / total_files as f64
    };

    let dependency_stability = if total_files == 0 {
        1.0
    } else {
        graph.nodes.iter().map(|n| n.stability).sum::<f64>() / total_files as f64
    };

    let members: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();

    GraphMetrics {
        total_files,
        total_dependencies,
        average_dependencies,
        max_dependencies,
        dependency_cohesion: pair_cohesion(&members, &graph.edges),
        dependency_stability,
    }
}

/// Share of possible unordered member pairs that are joined by at least one
/// edge. Defined as 1 for fewer than two members. Self-loops and edges
/// leaving the member set do not count.
pub fn pair_cohesion(members: &HashSet<&str>, edges: &[DependencyGraphEdge]) -> f64 {
    let n = members.len();
    if n <= 1 {
        return 1.0;
    }
    let connected: HashSet<(&str, &str)> = edges
        .iter()
        .filter(|e| e.source != e.target)
        .filter(|e| members.contains(e.source.as_str()) && members.contains(e.target.as_str()))
        .map(|e| {
            let (s, t) = (e.source.as_str(), e.target.as_str());
            if s < t {
                (s, t)
            } else {
                (t, s)
            }
        })
        .collect();
    let possible = n * (n - 1) / 2;
    connected.len() as f64 / possible as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_graph;
    use contextgraph_core::{EdgeKind, FileClass, RawDependency, SourceFile};

    fn file(id: &str, targets: &[&str]) -> SourceFile {
        SourceFile {
            id: id.to_string(),
            imports: Vec::new(),
            exports: Vec::new(),
            file_class: FileClass::Util,
            size: 0,
            complexity: 1,
            dependencies: targets
                .iter()
                .map(|t| RawDependency {
                    target: t.to_string(),
                    kind: EdgeKind::Import,
                })
                .collect(),
        }
    }

    #[test]
    fn empty_and_single_node_graphs_are_cohesive() {
        let empty = graph_metrics(&DependencyGraph::default());
        assert_eq!(empty.dependency_cohesion, 1.0);
        assert_eq!(empty.dependency_stability, 1.0);
        assert_eq!(empty.average_dependencies, 0.0);

        let single = graph_metrics(&build_graph(&[file("a.ts", &[])]));
        assert_eq!(single.dependency_cohesion, 1.0);
        assert_eq!(single.total_files, 1);
    }

    #[test]
    fn two_nodes_one_edge_is_fully_cohesive() {
        let metrics = graph_metrics(&build_graph(&[file("a.ts", &["b.ts"]), file("b.ts", &[])]));
        assert_eq!(metrics.dependency_cohesion, 1.0);
        assert_eq!(metrics.total_dependencies, 1);
        assert_eq!(metrics.max_dependencies, 1);
        assert_eq!(metrics.average_dependencies, 0.5);
        // a: 1.0, b: 0.0
        assert_eq!(metrics.dependency_stability, 0.5);
    }

    #[test]
    fn cohesion_ignores_foreign_targets_and_reverse_duplicates() {
        let metrics = graph_metrics(&build_graph(&[
            file("a.ts", &["b.ts", "react"]),
            file("b.ts", &["a.ts"]),
            file("c.ts", &[]),
        ]));
        // one connected pair out of three
        assert!((metrics.dependency_cohesion - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(metrics.max_dependencies, 2);
        assert_eq!(metrics.total_dependencies, 3);
    }
}
