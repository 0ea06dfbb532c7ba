//! Reduction of an exploration graph to the paths that lead to matches.

use crate::{ExplorationGraph, NodeId, SearchPattern};
use objgraph_core::{EdgeData, NodeColor, NodeData};
use petgraph::graphmap::DiGraphMap;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

/// The part of an exploration graph that connects the root to every match.
/// Node ids are the ids of the exploration graph.
#[derive(Debug, Clone)]
pub struct Subgraph {
    root: Option<NodeId>,
    nodes: HashMap<NodeId, NodeData>,
    edges: DiGraphMap<NodeId, EdgeData>,
}

impl Subgraph {
    pub fn new(root: Option<NodeId>) -> Self {
        Self {
            root,
            nodes: HashMap::new(),
            edges: DiGraphMap::new(),
        }
    }

    fn insert(&mut self, from: NodeId, from_data: &NodeData, to: NodeId, to_data: &NodeData, edge: &EdgeData) {
        self.nodes.insert(from, from_data.clone());
        self.nodes.insert(to, to_data.clone());
        self.edges.add_edge(from, to, edge.clone());
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(&id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Node ids in ascending order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Outgoing edges of `id` in discovery order.
    pub fn children(&self, id: NodeId) -> Vec<(NodeId, &EdgeData)> {
        if !self.edges.contains_node(id) {
            return Vec::new();
        }
        let mut children: Vec<_> = self.edges.edges(id).map(|(_, to, data)| (to, data)).collect();
        children.sort_by_key(|(_, data)| data.seq);
        children
    }

    /// All edges as `(from, to, data)` in discovery order.
    pub fn edges(&self) -> Vec<(NodeId, NodeId, &EdgeData)> {
        let mut edges: Vec<_> = self.edges.all_edges().collect();
        edges.sort_by_key(|(_, _, data)| data.seq);
        edges
    }

    /// Nodes reachable from the root, root included.
    pub fn reachable_from_root(&self) -> HashSet<NodeId> {
        let mut seen = HashSet::new();
        let Some(root) = self.root.filter(|r| self.contains_node(*r)) else {
            return seen;
        };
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if seen.insert(node) {
                stack.extend(self.children(node).into_iter().map(|(child, _)| child));
            }
        }
        seen
    }
}

/// Extracts the minimal subgraph connecting the root to every node whose
/// label matches `pattern` and, with `match_edges`, every matching edge.
///
/// Matching nodes are tagged [`NodeColor::Match`] in `graph` as well. The root
/// is always tagged [`NodeColor::Root`] in the result.
pub fn strip(graph: &mut ExplorationGraph, pattern: &SearchPattern, match_edges: bool) -> Subgraph {
    let mut stripped = Subgraph::new(graph.root());

    let Some(order) = graph.topological_order() else {
        warn!("Exploration graph is cyclic; nothing to strip");
        return stripped;
    };

    let mut include: HashSet<NodeId> = HashSet::new();

    // Children before parents.
    for node in order.into_iter().rev() {
        let is_match = graph
            .node(node)
            .is_some_and(|data| pattern.is_match(&data.label));
        if is_match {
            graph.set_color(node, NodeColor::Match);
        }
        let include_parents = is_match || include.contains(&node);

        let Some(node_data) = graph.node(node) else {
            continue;
        };
        for (parent, edge) in graph.parents(node) {
            let edge_hit = match_edges && pattern.is_match(&edge.label);
            if !(include_parents || edge_hit) {
                continue;
            }
            include.insert(parent);
            if let Some(parent_data) = graph.node(parent) {
                stripped.insert(parent, parent_data, node, node_data, edge);
            }
        }
    }

    if let Some(root) = stripped.root {
        if let Some(data) = stripped.nodes.get_mut(&root) {
            data.color = NodeColor::Root;
        }
    }

    info!(
        "Stripped graph length: {} -> {}",
        graph.node_count(),
        stripped.node_count()
    );
    stripped
}

#[cfg(test)]
mod tests {
    use super::*;
    use objgraph_core::Value;

    /// root -> a -> leaf("Target")
    ///      -> b -> c
    fn sample() -> (ExplorationGraph, Vec<NodeId>) {
        let mut graph = ExplorationGraph::new();
        let root = graph.add_root(&Value::list(vec![]));
        let a = graph.connect(root, &Value::tuple(vec![]), "alpha").unwrap();
        let leaf = graph.connect(a, &Value::type_object("Target"), "leaf").unwrap();
        let b = graph.connect(root, &Value::set(vec![]), "beta").unwrap();
        let c = graph.connect(b, &Value::from(1i64), "gamma_target()").unwrap();
        (graph, vec![root, a, leaf, b, c])
    }

    #[test]
    fn test_strip_node_match() {
        let (mut graph, ids) = sample();
        let pattern = SearchPattern::new("^type$").unwrap();
        let stripped = strip(&mut graph, &pattern, false);

        assert_eq!(stripped.node_ids(), vec![ids[0], ids[1], ids[2]]);
        assert_eq!(stripped.edge_count(), 2);
        assert_eq!(stripped.node(ids[0]).unwrap().color, NodeColor::Root);
        assert_eq!(stripped.node(ids[2]).unwrap().color, NodeColor::Match);
        assert_eq!(graph.node(ids[2]).unwrap().color, NodeColor::Match);
    }

    #[test]
    fn test_strip_edge_match() {
        let (mut graph, ids) = sample();
        let pattern = SearchPattern::new("target").unwrap();

        let with_edges = strip(&mut graph, &pattern, true);
        assert_eq!(with_edges.node_ids(), vec![ids[0], ids[3], ids[4]]);

        let without = strip(&mut graph, &pattern, false);
        assert!(without.is_empty());
    }

    #[test]
    fn test_no_match_is_empty() {
        let (mut graph, _) = sample();
        let stripped = strip(&mut graph, &SearchPattern::never(), true);
        assert!(stripped.is_empty());
        assert_eq!(stripped.edge_count(), 0);
    }

    #[test]
    fn test_every_node_reachable_from_root() {
        let (mut graph, _) = sample();
        let pattern = SearchPattern::new("i64|type").unwrap();
        let stripped = strip(&mut graph, &pattern, true);
        assert_eq!(stripped.node_count(), 5);
        assert_eq!(stripped.reachable_from_root().len(), stripped.node_count());
    }
}
