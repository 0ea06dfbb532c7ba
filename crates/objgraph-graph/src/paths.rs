use crate::{NodeId, Subgraph};

/// Lazily yields one line per root-to-leaf path of `subgraph`, starting at
/// `start`. Each call starts from scratch, so the sequence can be re-derived
/// any number of times. Nothing is yielded when `start` is not part of
/// `subgraph`.
pub fn to_paths<'a>(subgraph: &'a Subgraph, start: NodeId, prefix: &str) -> Paths<'a> {
    let mut stack = Vec::new();
    if subgraph.contains_node(start) {
        stack.push((start, prefix.to_string()));
    }
    Paths { subgraph, stack }
}

/// Iterator returned by [`to_paths`].
pub struct Paths<'a> {
    subgraph: &'a Subgraph,
    stack: Vec<(NodeId, String)>,
}

impl Iterator for Paths<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some((node, prefix)) = self.stack.pop() {
            let children = self.subgraph.children(node);
            if children.is_empty() {
                let label = self
                    .subgraph
                    .node(node)
                    .map(|data| data.label.as_str())
                    .unwrap_or_default();
                return Some(format!("{} -> '{}'", prefix, label));
            }
            // Reversed so the first child is popped first.
            for (child, edge) in children.into_iter().rev() {
                self.stack.push((child, format!("{}.{}", prefix, edge.label)));
            }
        }
        None
    }
}
