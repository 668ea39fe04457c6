use crate::{Cycle, GraphModel, LayoutEngine, LayoutError};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::debug;

/// Upper bound on the number of nodes a single tree expansion may create
pub const DEFAULT_MAX_TREE_NODES: usize = 10_000;

/// Upper bound on the number of nodes on any root-to-leaf path
pub const DEFAULT_MAX_TREE_DEPTH: usize = 512;

/// A node of a rooted tree, owning its children
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub id: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(id: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            id: id.into(),
            children,
        }
    }

    pub fn leaf(id: impl Into<String>) -> Self {
        Self::new(id, Vec::new())
    }

    /// Number of nodes in this subtree, itself included
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(TreeNode::len).sum::<usize>()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of edges on the longest path down to a leaf
    pub fn height(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.height() + 1)
            .max()
            .unwrap_or(0)
    }

    /// All nodes of the subtree in breadth-first order, starting with `self`
    pub fn descendants(&self) -> Vec<&TreeNode> {
        let mut nodes = Vec::new();
        let mut queue = VecDeque::from([self]);
        while let Some(node) = queue.pop_front() {
            nodes.push(node);
            queue.extend(node.children.iter());
        }
        nodes
    }

    /// `(parent, child)` id pairs, in the order of [`TreeNode::descendants`]
    pub fn links(&self) -> Vec<(&str, &str)> {
        self.descendants()
            .into_iter()
            .flat_map(|parent| {
                parent
                    .children
                    .iter()
                    .map(move |child| (parent.id.as_str(), child.id.as_str()))
            })
            .collect()
    }
}

/// Expands the edges of a graph into a tree hanging from a chosen root
///
/// A node's children are the targets of its out-edges, in edge order. A node
/// reachable along several paths is repeated once per path. Expansion fails
/// as soon as a path comes back to one of its own nodes, when more than
/// `max_nodes` tree nodes would be created, and when a path would grow
/// longer than `max_depth` nodes.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    root: String,
    max_nodes: usize,
    max_depth: usize,
}

impl TreeBuilder {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            max_nodes: DEFAULT_MAX_TREE_NODES,
            max_depth: DEFAULT_MAX_TREE_DEPTH,
        }
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Cap the path length; expansion recurses once per level
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }
}

impl LayoutEngine for TreeBuilder {
    type Output = TreeNode;

    fn build(&self, model: &GraphModel) -> Result<TreeNode, LayoutError> {
        let root = model
            .index_of(self.root())
            .ok_or_else(|| LayoutError::RootNotFound(self.root.clone()))?;

        let successors = model.successors();
        let mut expansion = Expansion {
            model,
            successors: &successors,
            on_path: vec![false; model.node_count()],
            path: Vec::new(),
            created: 0,
            builder: self,
        };
        let tree = expansion.expand(root)?;

        debug!(
            "Expanded tree from {:?}: {} nodes, height {}",
            self.root(),
            expansion.created,
            tree.height()
        );
        Ok(tree)
    }
}

/// State of one depth-first expansion
struct Expansion<'a> {
    model: &'a GraphModel,
    successors: &'a [Vec<usize>],
    on_path: Vec<bool>,
    path: Vec<usize>,
    created: usize,
    builder: &'a TreeBuilder,
}

impl Expansion<'_> {
    fn expand(&mut self, index: usize) -> Result<TreeNode, LayoutError> {
        self.created += 1;
        if self.created > self.builder.max_nodes {
            return Err(LayoutError::TreeTooLarge {
                root: self.builder.root.clone(),
                limit: self.builder.max_nodes,
            });
        }

        if self.path.len() >= self.builder.max_depth {
            return Err(LayoutError::TreeTooDeep {
                root: self.builder.root.clone(),
                limit: self.builder.max_depth,
            });
        }

        self.on_path[index] = true;
        self.path.push(index);

        let successors = self.successors;
        let mut children = Vec::with_capacity(successors[index].len());
        for &child in &successors[index] {
            if self.on_path[child] {
                return Err(LayoutError::CycleDetected(Cycle::Path(self.path_ids(child))));
            }
            children.push(self.expand(child)?);
        }

        self.path.pop();
        self.on_path[index] = false;

        Ok(TreeNode::new(self.id(index), children))
    }

    fn id(&self, index: usize) -> &str {
        &self.model.nodes()[index].id
    }

    /// Ids on the current path followed by the node closing the loop
    fn path_ids(&self, repeated: usize) -> Vec<String> {
        self.path
            .iter()
            .chain(std::iter::once(&repeated))
            .map(|&index| self.id(index).to_string())
            .collect()
    }
}
