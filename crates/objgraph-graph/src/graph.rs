use crate::{IdentityRegistry, NodeId};
use objgraph_core::{EdgeColor, EdgeData, NodeColor, NodeData, Value};
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::{Dfs, EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use tracing::trace;

/// Previews longer than this are shortened to their first and last chunk.
pub const PREVIEW_WIDTH: usize = 80;

/// Directed acyclic graph of explored values.
///
/// Every insertion goes through the identity registry, so the same shared
/// value always maps to the same node. Edges that would close a cycle are
/// rejected.
pub struct ExplorationGraph {
    graph: StableDiGraph<NodeData, EdgeData>,
    registry: IdentityRegistry,
    root: Option<NodeId>,
    next_seq: usize,
}

impl Default for ExplorationGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplorationGraph {
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            registry: IdentityRegistry::new(),
            root: None,
            next_seq: 0,
        }
    }

    /// Registers `value` as the root at level 0.
    pub fn add_root(&mut self, value: &Value) -> NodeId {
        let id = self.add_node(value, 0);
        self.root = Some(id);
        id
    }

    /// Adds `value` if it is not present yet and returns its id. The level of
    /// an existing node is never changed.
    pub fn add_node(&mut self, value: &Value, level: usize) -> NodeId {
        if let Some(id) = self.registry.lookup(value) {
            if self.graph.contains_node(id) {
                return id;
            }
        }

        let color = if value.is_error() {
            NodeColor::Error
        } else {
            NodeColor::Default
        };
        let id = self.graph.add_node(NodeData {
            label: node_label(value),
            preview: shorten_preview(&value.render(1)),
            level,
            color,
        });
        self.registry.register(id, value);
        id
    }

    /// Adds an edge from `from` to the node of `value`.
    ///
    /// Returns `false` when the edge would close a cycle; the edge is not
    /// inserted and the caller should stop descending into `value`.
    pub fn add_edge(&mut self, from: NodeId, value: &Value, label: &str) -> bool {
        self.connect(from, value, label).is_some()
    }

    /// Same as [`add_edge`](Self::add_edge) but hands back the child's id.
    pub fn connect(&mut self, from: NodeId, value: &Value, label: &str) -> Option<NodeId> {
        let parent_level = self.graph.node_weight(from)?.level;
        let child = self.add_node(value, parent_level + 1);

        if self.has_path(child, from) {
            trace!("Rejected edge '{}': closes a cycle", label);
            return None;
        }

        let child_level = self.graph[child].level;
        let color = EdgeColor::classify(label, parent_level, child_level);

        // At most one edge per pair; a repeated access overwrites the label.
        if let Some(edge) = self.graph.find_edge(from, child) {
            let data = &mut self.graph[edge];
            data.label = label.to_string();
            data.color = color;
        } else {
            let seq = self.next_seq;
            self.next_seq += 1;
            self.graph.add_edge(
                from,
                child,
                EdgeData {
                    label: label.to_string(),
                    color,
                    seq,
                },
            );
        }
        Some(child)
    }

    /// Discards a node, its edges and its identity mapping.
    pub fn remove_node(&mut self, id: NodeId) -> Option<NodeData> {
        self.registry.forget(id);
        if self.root == Some(id) {
            self.root = None;
        }
        self.graph.remove_node(id)
    }

    /// DFS reachability check: can we reach `to` from `from`?
    pub fn has_path(&self, from: NodeId, to: NodeId) -> bool {
        let mut dfs = Dfs::new(&self.graph, from);
        while let Some(node) = dfs.next(&self.graph) {
            if node == to {
                return true;
            }
        }
        false
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.graph.node_weight(id)
    }

    pub fn value(&self, id: NodeId) -> Option<&Value> {
        self.registry.value(id)
    }

    pub(crate) fn set_color(&mut self, id: NodeId, color: NodeColor) {
        if let Some(node) = self.graph.node_weight_mut(id) {
            node.color = color;
        }
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All edges as `(from, to, data)` in creation order.
    pub fn edges(&self) -> Vec<(NodeId, NodeId, &EdgeData)> {
        let mut edges: Vec<_> = self
            .graph
            .edge_references()
            .map(|e| (e.source(), e.target(), e.weight()))
            .collect();
        edges.sort_by_key(|(_, _, data)| data.seq);
        edges
    }

    /// Incoming edges of `id` as `(parent, data)`.
    pub fn parents(&self, id: NodeId) -> Vec<(NodeId, &EdgeData)> {
        self.graph
            .neighbors_directed(id, Direction::Incoming)
            .filter_map(|parent| {
                self.graph
                    .find_edge(parent, id)
                    .map(|edge| (parent, &self.graph[edge]))
            })
            .collect()
    }

    /// Outgoing edges of `id` as `(child, data)` in creation order.
    pub fn children(&self, id: NodeId) -> Vec<(NodeId, &EdgeData)> {
        let mut children: Vec<_> = self
            .graph
            .edges_directed(id, Direction::Outgoing)
            .map(|e| (e.target(), e.weight()))
            .collect();
        children.sort_by_key(|(_, data)| data.seq);
        children
    }

    pub fn is_cyclic(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }

    /// Nodes ordered so that every parent precedes its children.
    pub fn topological_order(&self) -> Option<Vec<NodeId>> {
        petgraph::algo::toposort(&self.graph, None).ok()
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }
}

/// Type name, or `<Type> of size <N>` for countable containers.
pub fn node_label(value: &Value) -> String {
    match value.len() {
        Some(len) => format!("{} of size {}", value.type_name(), len),
        None => value.type_name(),
    }
}

/// Shortens a rendered value to its first line, followed by `..., <last line>`
/// when it does not fit into [`PREVIEW_WIDTH`]. Surrounding angle brackets are
/// stripped.
pub fn shorten_preview(text: &str) -> String {
    let lines = wrap_items(text, PREVIEW_WIDTH);
    let mut short = lines.first().cloned().unwrap_or_default();
    if lines.len() > 1 {
        if let Some(last) = lines.last() {
            short = format!("{} ..., {}", short, last);
        }
    }
    short.trim_matches(|c| c == '<' || c == '>').to_string()
}

/// Greedily packs `, `-separated items into lines of at most `width` chars.
/// A single item longer than `width` gets a line of its own.
fn wrap_items(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for item in text.split(", ") {
        if current.is_empty() {
            current.push_str(item);
        } else if current.chars().count() + 2 + item.chars().count() <= width {
            current.push_str(", ");
            current.push_str(item);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(item);
        }
    }
    lines.push(current);
    lines
}
