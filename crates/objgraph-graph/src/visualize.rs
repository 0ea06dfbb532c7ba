//! Hand-off of a stripped graph to an external renderer.

use crate::Subgraph;
use objgraph_core::{ObjGraphError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Consumer of stripped graphs. Implementations write some artifact and
/// return where it ended up.
pub trait Visualizer {
    fn render(&self, subgraph: &Subgraph, name: &str) -> Result<PathBuf>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkNode {
    pub id: usize,
    pub label: String,
    pub title: String,
    pub level: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkEdge {
    pub from: usize,
    pub to: usize,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Node-link document as consumed by vis-network style renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkDocument {
    pub name: String,
    pub root: Option<usize>,
    pub nodes: Vec<NodeLinkNode>,
    pub edges: Vec<NodeLinkEdge>,
}

impl NodeLinkDocument {
    pub fn from_subgraph(subgraph: &Subgraph, name: &str) -> Self {
        let nodes = subgraph
            .node_ids()
            .into_iter()
            .filter_map(|id| {
                subgraph.node(id).map(|data| NodeLinkNode {
                    id: id.index(),
                    label: data.label.clone(),
                    title: data.preview.clone(),
                    level: data.level,
                    color: data.color.css().map(str::to_string),
                })
            })
            .collect();
        let edges = subgraph
            .edges()
            .into_iter()
            .map(|(from, to, data)| NodeLinkEdge {
                from: from.index(),
                to: to.index(),
                label: data.label.clone(),
                color: data.color.css().map(str::to_string),
            })
            .collect();
        Self {
            name: name.to_string(),
            root: subgraph.root().map(|r| r.index()),
            nodes,
            edges,
        }
    }
}

/// Writes `<output_dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct JsonVisualizer {
    output_dir: PathBuf,
}

impl JsonVisualizer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl Visualizer for JsonVisualizer {
    fn render(&self, subgraph: &Subgraph, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(ObjGraphError::Visualization(format!(
                "invalid artifact name '{}'",
                name
            )));
        }
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(format!("{}.json", name));
        let document = NodeLinkDocument::from_subgraph(subgraph, name);
        fs::write(&path, serde_json::to_string_pretty(&document)?)?;
        info!("Graph written to {}", path.display());
        Ok(path)
    }
}
