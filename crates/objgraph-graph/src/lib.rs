pub mod filter;
pub mod find;
pub mod graph;
pub mod identity;
pub mod paths;
pub mod pattern;
pub mod strip;
pub mod traversal;
pub mod visualize;

pub use filter::*;
pub use find::*;
pub use graph::*;
pub use identity::*;
pub use paths::*;
pub use pattern::*;
pub use strip::*;
pub use traversal::*;
pub use visualize::*;

/// Handle of a node in an exploration graph.
pub type NodeId = petgraph::stable_graph::NodeIndex;
