use crate::{ExplorationGraph, MembershipFilter, NodeId};
use indicatif::{ProgressBar, ProgressStyle};
use objgraph_core::{namespace_root, ExploreConfig, Inspectable, MemberKind, ProducerError, Value};
use std::collections::HashSet;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

/// Configuration for one exploration
#[derive(Debug, Clone)]
pub struct TraversalConfig {
    /// Values reached at this depth or deeper are not recorded
    pub max_depth: usize,
    /// Namespace root to stay within; taken from the first explored object when unset
    pub namespace: Option<String>,
    /// Show a progress bar for the root object's members
    pub progress: bool,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            namespace: None,
            progress: false,
        }
    }
}

impl From<&ExploreConfig> for TraversalConfig {
    fn from(config: &ExploreConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            namespace: config.namespace.clone(),
            progress: config.progress,
        }
    }
}

/// Mutable state owned by a single exploration.
#[derive(Debug, Clone, Default)]
pub struct ExplorationContext {
    invoked: HashSet<String>,
    visited_types: HashSet<String>,
    namespace: Option<String>,
}

impl ExplorationContext {
    pub fn new(namespace: Option<String>) -> Self {
        Self {
            namespace,
            ..Self::default()
        }
    }

    /// Marks a producer as invoked. Returns `false` if it already was.
    pub fn try_mark_invoked(&mut self, qualified_name: &str) -> bool {
        self.invoked.insert(qualified_name.to_string())
    }

    /// Marks a type as visited. Returns `false` if it already was.
    pub fn mark_type_visited(&mut self, qualified_type: &str) -> bool {
        self.visited_types.insert(qualified_type.to_string())
    }

    pub fn was_invoked(&self, qualified_name: &str) -> bool {
        self.invoked.contains(qualified_name)
    }

    pub fn invoked(&self) -> &HashSet<String> {
        &self.invoked
    }

    pub fn visited_types(&self) -> &HashSet<String> {
        &self.visited_types
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// `true` if `obj` belongs to the explored namespace. The first object
    /// checked fixes the namespace when none was configured.
    fn admits(&mut self, obj: &dyn Inspectable) -> bool {
        let root = namespace_root(obj.namespace());
        match &self.namespace {
            Some(ns) => ns == root,
            None => {
                self.namespace = Some(root.to_string());
                true
            }
        }
    }
}

/// Result of an exploration: the full graph plus the context it was built with.
pub struct Exploration {
    pub graph: ExplorationGraph,
    pub context: ExplorationContext,
    pub root: NodeId,
}

impl fmt::Debug for Exploration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exploration")
            .field("root", &self.root)
            .field("nodes", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .field("invoked", &self.context.invoked.len())
            .finish()
    }
}

/// `namespace::Type`
pub fn qualified_type(obj: &dyn Inspectable) -> String {
    format!("{}::{}", obj.namespace(), obj.type_name())
}

/// Depth-first explorer. Stateless between explorations; all per-run state
/// lives in the [`ExplorationContext`] of each [`explore`](Self::explore) call.
pub struct Traverser {
    filter: MembershipFilter,
    config: TraversalConfig,
}

struct Walk<'a> {
    graph: &'a mut ExplorationGraph,
    context: &'a mut ExplorationContext,
}

impl Traverser {
    pub fn new(filter: MembershipFilter, config: TraversalConfig) -> Self {
        Self { filter, config }
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    pub fn explore(&self, root: &Value) -> Exploration {
        let mut graph = ExplorationGraph::new();
        let mut context = ExplorationContext::new(self.config.namespace.clone());
        let root_id = graph.add_root(root);

        let mut walk = Walk {
            graph: &mut graph,
            context: &mut context,
        };
        self.visit(&mut walk, root, None, 0);

        debug!(
            "Exploration finished: {} nodes, {} edges, {} producers invoked",
            graph.node_count(),
            graph.edge_count(),
            context.invoked().len()
        );
        Exploration {
            graph,
            context,
            root: root_id,
        }
    }

    fn visit(&self, walk: &mut Walk<'_>, value: &Value, parent: Option<(NodeId, String)>, level: usize) {
        if level >= self.config.max_depth {
            return;
        }

        let node = match &parent {
            Some((parent_id, label)) => match walk.graph.connect(*parent_id, value, label) {
                Some(node) => node,
                None => return,
            },
            None => match walk.graph.root() {
                Some(root) => root,
                None => return,
            },
        };

        match value {
            Value::Scalar(_) | Value::Error(_) => {}
            Value::Mapping(map) => {
                for (key, entry) in map.iter() {
                    self.visit(walk, entry, Some((node, format!("['{}']", key))), level + 1);
                }
            }
            Value::Sequence(seq) => {
                let Some(first) = seq.first() else {
                    return;
                };
                match parent {
                    Some((parent_id, label)) => {
                        // Skip the collection: the parent links straight to the sample.
                        walk.graph.remove_node(node);
                        self.visit(walk, first, Some((parent_id, format!("{}[0]", label))), level + 1);
                    }
                    None => self.visit(walk, first, Some((node, "[0]".to_string())), level + 1),
                }
            }
            Value::Object(obj) => self.inspect(walk, node, obj, level),
        }
    }

    fn inspect(&self, walk: &mut Walk<'_>, node: NodeId, obj: &Arc<dyn Inspectable>, level: usize) {
        if !walk.context.admits(obj.as_ref()) {
            return;
        }
        let type_key = qualified_type(obj.as_ref());
        if !walk.context.mark_type_visited(&type_key) {
            return;
        }

        debug!(
            "{}Inspecting {} (level={}): {}",
            "  ".repeat(level),
            obj.type_name(),
            level,
            obj.preview()
        );

        let members = obj.members();
        let progress = self.progress_bar(level, obj.type_name(), members.len());

        for member in members {
            progress.inc(1);
            if member.name.starts_with("__") || self.filter.should_ignore(obj.as_ref(), &member.name) {
                continue;
            }
            match member.kind {
                MemberKind::Producer => {
                    let qualified = format!("{}.{}", type_key, member.name);
                    if walk.context.try_mark_invoked(&qualified) {
                        self.invoke(walk, node, obj, &member.name, &qualified, level);
                    }
                }
                MemberKind::Field | MemberKind::Container | MemberKind::Mapping => {
                    match obj.get(&member.name) {
                        Ok(child) => self.visit(walk, &child, Some((node, member.name)), level + 1),
                        Err(err) => debug!("{}Skipping {}: {}", "  ".repeat(level + 1), type_key, err),
                    }
                }
            }
        }
        progress.finish_and_clear();
    }

    fn invoke(
        &self,
        walk: &mut Walk<'_>,
        node: NodeId,
        obj: &Arc<dyn Inspectable>,
        name: &str,
        qualified: &str,
        level: usize,
    ) {
        debug!("{}Executing {}()", "  ".repeat(level + 1), qualified);

        // The process panic hook still reports to stderr.
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let mut discard = std::io::sink();
            obj.call(name, &mut discard)
        }));
        let label = format!("{}()", name);

        let failure = match outcome {
            Ok(Ok(result)) => {
                self.visit(walk, &result, Some((node, label)), level + 1);
                return;
            }
            Ok(Err(err)) => err,
            Err(payload) => {
                warn!("Producer {}() panicked", qualified);
                ProducerError::from_panic(payload.as_ref())
            }
        };

        // A fresh value per failure keeps every error node distinct.
        let error = Value::error(ProducerError::new(failure.type_name, failure.message));
        walk.graph.add_edge(node, &error, &label);
    }

    fn progress_bar(&self, level: usize, type_name: &str, len: usize) -> ProgressBar {
        if !self.config.progress || level > 0 {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::with_template("{msg} {bar:40.cyan/blue} {pos}/{len}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Inspecting '{}'", type_name));
        pb
    }
}
