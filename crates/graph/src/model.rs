use derive_more::{Constructor, Display, From};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::HashMap;

/// A graph vertex, identified by its trimmed token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Display, From)]
#[display("{id}")]
pub struct Node {
    pub id: String,
}

impl From<&str> for Node {
    fn from(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

/// A directed connection between two node ids
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Constructor)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

/// Nodes and directed edges of one parsed edge list
///
/// Nodes are kept in first-seen order and deduplicated by id. Edges keep
/// their input order, duplicates included. An edge may name an id that is
/// not a node; consumers skip such edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphModel {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from loose parts, collapsing duplicate nodes
    pub fn from_parts(
        nodes: impl IntoIterator<Item = Node>,
        edges: impl IntoIterator<Item = Edge>,
    ) -> Self {
        let mut model = Self::new();
        for node in nodes {
            model.insert_node(&node.id);
        }
        for edge in edges {
            model.push_edge(edge);
        }
        model
    }

    /// Insert a node if it is not already present and return its index
    pub fn insert_node(&mut self, id: &str) -> usize {
        if let Some(&index) = self.index.get(id) {
            return index;
        }
        let index = self.nodes.len();
        self.nodes.push(Node::from(id));
        self.index.insert(id.to_string(), index);
        index
    }

    /// Append an edge without touching the node set
    pub fn push_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).and_then(|index| self.nodes.get(index))
    }

    /// The first node seen while parsing
    pub fn first(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// Edges with both endpoints resolved to node indices, in edge order
    pub fn resolved_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edges
            .iter()
            .filter_map(|edge| Some((self.index_of(&edge.source)?, self.index_of(&edge.target)?)))
    }

    /// Out-neighbour lists indexed by node index
    ///
    /// Each list holds target indices in edge order, one entry per edge.
    pub fn successors(&self) -> Vec<Vec<usize>> {
        let mut successors = vec![Vec::new(); self.nodes.len()];
        for (source, target) in self.resolved_edges() {
            successors[source].push(target);
        }
        successors
    }

    /// Export the model as a petgraph graph
    ///
    /// Node indices match the model's node order. Dangling edges are left out.
    pub fn to_graph(&self) -> DiGraph<&str, ()> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        for node in &self.nodes {
            graph.add_node(node.id.as_str());
        }
        for (source, target) in self.resolved_edges() {
            graph.add_edge(NodeIndex::new(source), NodeIndex::new(target), ());
        }
        graph
    }
}
