use crate::metrics::pair_cohesion;
use contextgraph_core::{Cluster, DependencyGraph};
use std::collections::{BTreeMap, BTreeSet, HashSet};

const ROOT_CLUSTER: &str = "root";

/// Groups nodes by outgoing reachability.
///
/// Seeds are taken in id order; each seed collects every not-yet-visited
/// node reachable through outgoing edges. This is not undirected
/// connectivity: a node that only points into an earlier cluster starts a
/// cluster of its own. Edges to ids outside the node set are not followed.
pub fn identify_clusters(graph: &DependencyGraph) -> Vec<Cluster> {
    let node_ids: BTreeSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    let mut outgoing: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for edge in &graph.edges {
        if node_ids.contains(edge.target.as_str()) {
            outgoing
                .entry(edge.source.as_str())
                .or_default()
                .insert(edge.target.as_str());
        }
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut clusters = Vec::new();

    for &seed in &node_ids {
        if !visited.insert(seed) {
            continue;
        }
        let mut members = vec![seed];
        let mut pending = vec![seed];
        while let Some(node) = pending.pop() {
            for &target in outgoing.get(node).into_iter().flatten() {
                if visited.insert(target) {
                    members.push(target);
                    pending.push(target);
                }
            }
        }
        members.sort_unstable();

        let member_set: HashSet<&str> = members.iter().copied().collect();
        clusters.push(Cluster {
            name: cluster_name(&members),
            cohesion: pair_cohesion(&member_set, &graph.edges),
            files: members.iter().map(|m| m.to_string()).collect(),
        });
    }

    clusters
}

/// Directory segments shared by every member, or `root` when none are.
fn cluster_name(members: &[&str]) -> String {
    let dirs: Vec<Vec<&str>> = members
        .iter()
        .map(|id| {
            let mut parts: Vec<&str> = id.split('/').collect();
            parts.pop();
            parts
        })
        .collect();

    let Some(first) = dirs.first() else {
        return ROOT_CLUSTER.to_string();
    };
    let shared = first
        .iter()
        .enumerate()
        .take_while(|(i, seg)| dirs.iter().all(|d| d.get(*i) == Some(*seg)))
        .count();

    if shared == 0 {
        ROOT_CLUSTER.to_string()
    } else {
        first[..shared].join("/")
    }
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
    fn names_use_shared_directories() {
        assert_eq!(cluster_name(&["src/a/x.ts", "src/a/y.ts"]), "src/a");
        assert_eq!(cluster_name(&["src/a/x.ts", "src/b/y.ts"]), "src");
        assert_eq!(cluster_name(&["src/a.ts", "lib/b.ts"]), "root");
        assert_eq!(cluster_name(&["a.ts"]), "root");
    }

    #[test]
    fn clusters_follow_outgoing_edges_only() {
        let graph = build_graph(&[
            file("src/a.ts", &["src/b.ts", "react"]),
            file("src/b.ts", &[]),
            file("src/c.ts", &["src/b.ts"]),
        ]);
        let clusters = identify_clusters(&graph);
        let files: Vec<Vec<String>> = clusters.iter().map(|c| c.files.clone()).collect();
        // c points into a's cluster but is not reachable from it
        assert_eq!(
            files,
            vec![
                vec!["src/a.ts".to_string(), "src/b.ts".to_string()],
                vec!["src/c.ts".to_string()],
            ]
        );
        assert_eq!(clusters[0].name, "src");
        assert_eq!(clusters[0].cohesion, 1.0);
        assert_eq!(clusters[1].cohesion, 1.0);
    }

    #[test]
    fn cohesion_counts_internal_pairs() {
        let graph = build_graph(&[
            file("m/a.ts", &["m/b.ts", "m/c.ts"]),
            file("m/b.ts", &[]),
            file("m/c.ts", &[]),
        ]);
        let clusters = identify_clusters(&graph);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].name, "m");
        // a-b and a-c of three possible pairs
        assert!((clusters[0].cohesion - 2.0 / 3.0).abs() < 1e-9);
    }
}
