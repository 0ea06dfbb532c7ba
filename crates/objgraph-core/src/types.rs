use serde::{Deserialize, Serialize};
use std::fmt;

/// Highlight tag of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeColor {
    #[default]
    Default,
    Root,
    Error,
    Match,
}

impl NodeColor {
    /// Color name understood by web renderers, `None` for the renderer default.
    pub fn css(&self) -> Option<&'static str> {
        match self {
            NodeColor::Default => None,
            NodeColor::Root => Some("blue"),
            NodeColor::Error => Some("red"),
            NodeColor::Match => Some("green"),
        }
    }
}

impl fmt::Display for NodeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeColor::Default => "default",
            NodeColor::Root => "root",
            NodeColor::Error => "error",
            NodeColor::Match => "match",
        };
        write!(f, "{}", s)
    }
}

/// Classification of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EdgeColor {
    #[default]
    Plain,
    /// The child was produced by invoking a producer.
    Invocation,
    /// The child sits on a lower level than the parent.
    LevelUp,
}

impl EdgeColor {
    pub fn classify(label: &str, parent_level: usize, child_level: usize) -> Self {
        if label.ends_with("()") {
            EdgeColor::Invocation
        } else if child_level < parent_level {
            EdgeColor::LevelUp
        } else {
            EdgeColor::Plain
        }
    }

    pub fn css(&self) -> Option<&'static str> {
        match self {
            EdgeColor::Plain => None,
            EdgeColor::Invocation => Some("red"),
            EdgeColor::LevelUp => Some("magenta"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Type name, or `<Type> of size <N>` for containers.
    pub label: String,
    /// Short textual preview of the value.
    pub preview: String,
    pub level: usize,
    pub color: NodeColor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    /// Access path step: `field`, `['key']`, `[0]` or `name()`.
    pub label: String,
    pub color: EdgeColor,
    /// Creation order within the exploration.
    pub seq: usize,
}
