use crate::{GraphModel, LayoutError};

/// A builder that derives a layout structure from a graph model
///
/// Each implementation owns the structure it returns; nothing is shared
/// between two builds:
/// - [`TreeBuilder`](crate::TreeBuilder) expands a rooted tree for the tree and arc views
/// - [`TopologicalSorter`](crate::TopologicalSorter) orders nodes for the sequence view
pub trait LayoutEngine {
    /// The structure handed to the renderer
    type Output;

    /// Derive the layout structure for the given model
    ///
    /// # Errors
    /// Returns an error if the model cannot be laid out in this mode (e.g.,
    /// a missing root, or a cycle where an acyclic graph is required)
    fn build(&self, model: &GraphModel) -> Result<Self::Output, LayoutError>;
}
