//! Graph construction and layout precomputation for edge list visualizations
//!
//! This crate turns a raw `source,target` edge list into the structures a
//! renderer needs for each visualization mode. It never computes pixel
//! positions; it only decides structure (parent/child relationships and
//! visit order) that a generic layout engine cannot infer from a flat edge
//! list.
//!
//! # Builders
//!
//! - [`parse`]: edge list text to a [`GraphModel`]
//! - [`TreeBuilder`]: rooted [`TreeNode`] for the tree and arc views
//! - [`TopologicalSorter`]: Kahn ordering for the sequence view
//! - [`LayoutCoordinator`]: picks the builder for a [`Mode`] and keeps the current [`Scene`]
//!
//! # Example
//!
//! ```
//! use edgeviz_graph::{LayoutEngine, TopologicalSorter, TreeBuilder, parse};
//!
//! let model = parse("A,B\nA,C\nB,D").unwrap();
//!
//! // Use a builder directly
//! let sorted = TopologicalSorter.build(&model).unwrap();
//! assert_eq!(sorted.ids(), ["A", "B", "C", "D"]);
//!
//! let tree = TreeBuilder::new("A").build(&model).unwrap();
//! assert_eq!(tree.links(), [("A", "B"), ("A", "C"), ("B", "D")]);
//! ```
//!
//! Or go through the coordinator, which validates the request per mode:
//!
//! ```
//! use edgeviz_graph::{Layout, LayoutCoordinator, LayoutRequest, Mode};
//!
//! let mut coordinator = LayoutCoordinator::default();
//! let request = LayoutRequest::new(Mode::Tree, "A,B\nA,C\nB,D").with_root("A");
//! let scene = coordinator.trigger(&request).unwrap();
//! assert!(matches!(scene.layout, Layout::Tree(_)));
//! ```

mod coordinator;
mod engine;
mod error;
mod model;
mod parse;
mod topo;
mod tree;

pub use coordinator::{
    Layout, LayoutCoordinator, LayoutParams, LayoutRequest, Mode, Scene, UnknownMode,
};
pub use engine::LayoutEngine;
pub use error::{Cycle, LayoutError, MalformedRecord};
pub use model::{Edge, GraphModel, Node};
pub use parse::parse;
pub use topo::{SortedSequence, TopologicalSorter};
pub use tree::{TreeBuilder, TreeNode, DEFAULT_MAX_TREE_DEPTH, DEFAULT_MAX_TREE_NODES};

// Re-export petgraph so renderers can consume `GraphModel::to_graph`
pub use petgraph;
