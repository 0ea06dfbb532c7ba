//! Search entry point: explore, strip, report.

use crate::{
    strip, to_paths, Exploration, ExplorationGraph, JsonVisualizer, MembershipFilter, NodeId,
    Paths, SearchPattern, Subgraph, TraversalConfig, Traverser, Visualizer,
};
use objgraph_core::{EdgeData, ExploreConfig, ObjGraphError, Result, Value};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info};

/// Settings of one `find` call: the exploration settings plus an optional
/// visualizer. With `config.visualize` set and no visualizer, a
/// [`JsonVisualizer`] writing to `config.output_dir` is used.
#[derive(Default)]
pub struct FindOptions {
    pub config: ExploreConfig,
    pub visualizer: Option<Box<dyn Visualizer>>,
}

impl FindOptions {
    pub fn new(config: ExploreConfig) -> Self {
        Self {
            config,
            visualizer: None,
        }
    }

    pub fn with_visualizer(mut self, visualizer: impl Visualizer + 'static) -> Self {
        self.visualizer = Some(Box::new(visualizer));
        self
    }
}

impl From<ExploreConfig> for FindOptions {
    fn from(config: ExploreConfig) -> Self {
        Self::new(config)
    }
}

/// Everything a search produced.
#[derive(Debug)]
pub struct FindOutcome {
    /// Full exploration graph and its context.
    pub exploration: Exploration,
    pub subgraph: Subgraph,
    /// Name used as the first path segment.
    pub prefix: String,
    /// Visualizer output, when one ran.
    pub artifact: Option<PathBuf>,
}

impl FindOutcome {
    pub fn is_empty(&self) -> bool {
        self.subgraph.is_empty()
    }

    /// Root-to-match paths, starting at the explored root.
    pub fn paths(&self) -> Paths<'_> {
        to_paths(&self.subgraph, self.exploration.root, &self.prefix)
    }

    /// Paths below `node`, which must be part of the stripped graph.
    pub fn paths_from(&self, node: NodeId) -> Result<Paths<'_>> {
        if !self.subgraph.contains_node(node) {
            return Err(ObjGraphError::NodeNotFound(format!("{:?}", node)));
        }
        Ok(to_paths(&self.subgraph, node, &self.prefix))
    }
}

/// Searches everything reachable from `root` for `pattern`, printing the
/// matching paths to stdout when `verbose` is set.
pub fn find(root: &Value, pattern: &str, options: &FindOptions) -> Result<FindOutcome> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    find_to(root, pattern, options, &mut out)
}

/// Like [`find`] but writes the report to `out`.
pub fn find_to(
    root: &Value,
    pattern: &str,
    options: &FindOptions,
    out: &mut dyn Write,
) -> Result<FindOutcome> {
    let config = &options.config;
    config.validate()?;

    let filter = MembershipFilter::from_config(pattern, config)?;
    let search = SearchPattern::new(pattern)?;
    let traverser = Traverser::new(filter, TraversalConfig::from(config));

    info!("Searching for '{}' (max_depth={})", pattern, config.max_depth);
    let mut exploration = traverser.explore(root);
    let subgraph = strip(&mut exploration.graph, &search, config.match_edges);

    let prefix = root.type_name();
    let mut outcome = FindOutcome {
        exploration,
        subgraph,
        prefix,
        artifact: None,
    };

    if config.verbose {
        if outcome.is_empty() {
            writeln!(out, "No match")?;
        } else {
            for path in outcome.paths() {
                writeln!(out, "{}", path)?;
            }
        }
    }

    if config.visualize && !outcome.is_empty() {
        let artifact = match &options.visualizer {
            Some(visualizer) => visualizer.render(&outcome.subgraph, &outcome.prefix)?,
            None => JsonVisualizer::new(&config.output_dir).render(&outcome.subgraph, &outcome.prefix)?,
        };
        outcome.artifact = Some(artifact);
    }

    Ok(outcome)
}

/// Graphs whose edges carry labels.
pub trait LabeledEdges {
    fn edge_data(&self) -> Vec<&EdgeData>;
}

impl LabeledEdges for ExplorationGraph {
    fn edge_data(&self) -> Vec<&EdgeData> {
        self.edges().into_iter().map(|(_, _, data)| data).collect()
    }
}

impl LabeledEdges for Subgraph {
    fn edge_data(&self) -> Vec<&EdgeData> {
        self.edges().into_iter().map(|(_, _, data)| data).collect()
    }
}

/// Number of edges whose label starts with `prefix`.
pub fn count_edges_by_label_prefix(graph: &impl LabeledEdges, prefix: &str) -> usize {
    graph
        .edge_data()
        .into_iter()
        .filter(|edge| edge.label.starts_with(prefix))
        .inspect(|edge| debug!("Edge '{}' starts with '{}'", edge.label, prefix))
        .count()
}

/// Number of edges whose label contains a case-insensitive match of `pattern`.
pub fn count_edges_matching(graph: &impl LabeledEdges, pattern: &str) -> Result<usize> {
    let search = SearchPattern::new(pattern)?;
    Ok(graph
        .edge_data()
        .into_iter()
        .filter(|edge| search.is_match(&edge.label))
        .count())
}
