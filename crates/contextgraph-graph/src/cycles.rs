use contextgraph_core::{CircularDependency, DependencyGraph};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

/// Finds cycles with a depth-first walk over `source -> target`.
///
/// Every not-yet-explored node seeds a walk; reaching a node that is still on
/// the current path records the path segment from that node as one cycle.
/// A node counts as explored once all its neighbours have been visited.
/// Cycles with the same member set are reported once.
///
/// The walk keeps its own frame stack so deep graphs cannot overflow the
/// call stack.
pub fn detect_cycles(graph: &DependencyGraph) -> Vec<CircularDependency> {
    let mut adjacency: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for node in &graph.nodes {
        adjacency.entry(node.id.as_str()).or_default();
    }
    for edge in &graph.edges {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .insert(edge.target.as_str());
    }
    let neighbours: BTreeMap<&str, Vec<&str>> = adjacency
        .into_iter()
        .map(|(node, targets)| (node, targets.into_iter().collect()))
        .collect();

    let mut explored: HashSet<&str> = HashSet::new();
    let mut on_stack: HashSet<&str> = HashSet::new();
    let mut reported: BTreeSet<Vec<&str>> = BTreeSet::new();
    let mut cycles = Vec::new();

    for &start in neighbours.keys() {
        if explored.contains(start) {
            continue;
        }

        // (node, index of the next neighbour to visit)
        let mut frames: Vec<(&str, usize)> = vec![(start, 0)];
        let mut path: Vec<&str> = vec![start];
        on_stack.insert(start);

        while let Some(frame) = frames.last_mut() {
            let (node, next) = *frame;
            let targets = neighbours.get(node).map(Vec::as_slice).unwrap_or(&[]);

            let Some(&target) = targets.get(next) else {
                frames.pop();
                path.pop();
                on_stack.remove(node);
                explored.insert(node);
                continue;
            };
            frame.1 += 1;

            if on_stack.contains(target) {
                if let Some(pos) = path.iter().position(|&n| n == target) {
                    let members = &path[pos..];
                    let mut key: Vec<&str> = members.to_vec();
                    key.sort_unstable();
                    if reported.insert(key) {
                        cycles.push(circular_dependency(graph, members));
                    }
                }
            } else if !explored.contains(target) {
                frames.push((target, 0));
                path.push(target);
                on_stack.insert(target);
            }
        }
    }

    debug!("Detected {} circular dependencies", cycles.len());
    cycles
}

/// Impact is the summed weight of edges running between cycle members.
fn circular_dependency(graph: &DependencyGraph, members: &[&str]) -> CircularDependency {
    let member_set: HashSet<&str> = members.iter().copied().collect();
    let impact = graph
        .edges
        .iter()
        .filter(|e| member_set.contains(e.source.as_str()) && member_set.contains(e.target.as_str()))
        .map(|e| e.weight)
        .sum();
    CircularDependency {
        files: members.iter().map(|m| m.to_string()).collect(),
        length: members.len(),
        impact,
    }
}
