use contextgraph_core::{DependencyGraph, DependencyGraphEdge, DependencyGraphNode, SourceFile};
use std::collections::{HashMap, HashSet};

/// Turns per-file extraction records into nodes and weighted edges.
///
/// Edges are unique per `(source, target, kind)`. Targets are kept even when
/// they do not name a node (package imports, unresolved relative paths).
pub fn build_graph(files: &[SourceFile]) -> DependencyGraph {
    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    for file in files {
        for dep in &file.dependencies {
            if seen.insert((file.id.as_str(), dep.target.as_str(), &dep.kind)) {
                edges.push(DependencyGraphEdge::new(
                    file.id.clone(),
                    dep.target.clone(),
                    dep.kind.clone(),
                ));
            }
        }
    }

    let mut outgoing: HashMap<&str, usize> = HashMap::new();
    let mut incoming: HashMap<&str, usize> = HashMap::new();
    for edge in &edges {
        *outgoing.entry(edge.source.as_str()).or_default() += 1;
        *incoming.entry(edge.target.as_str()).or_default() += 1;
    }

    let nodes = files
        .iter()
        .map(|file| {
            let out = outgoing.get(file.id.as_str()).copied().unwrap_or(0);
            let inc = incoming.get(file.id.as_str()).copied().unwrap_or(0);
            DependencyGraphNode {
                id: file.id.clone(),
                imports: file.imports.clone(),
                exports: file.exports.clone(),
                file_class: file.file_class,
                size: file.size,
                complexity: file.complexity,
                stability: stability(inc, out),
            }
        })
        .collect();

    DependencyGraph { nodes, edges }
}

/// `out / (in + out)`; an isolated node counts as fully stable.
pub fn stability(incoming: usize, outgoing: usize) -> f64 {
    let total = incoming + outgoing;
    if total == 0 {
        1.0
    } else {
        outgoing as f64 / total as f64
    }
}
