use crate::Mode;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors that can abort a layout build
///
/// Every variant is recoverable: the coordinator reports it and keeps the
/// previously built scene.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// One or more lines did not split into a `source,target` pair
    #[error("{}", describe_records(.0))]
    MalformedRecords(Vec<MalformedRecord>),

    /// The requested root is not a node of the graph
    #[error("root node {0:?} not found")]
    RootNotFound(String),

    /// A cycle prevented the build from completing
    #[error("cycle detected: {0}")]
    CycleDetected(Cycle),

    /// The mode needs at least one node
    #[error("graph is empty, {0} layout needs at least one node")]
    EmptyGraph(Mode),

    /// Expanding the tree from `root` produced more than `limit` nodes
    #[error("tree expanded from {root:?} exceeds {limit} nodes")]
    TreeTooLarge { root: String, limit: usize },

    /// A path from `root` grew longer than `limit` nodes
    #[error("tree expanded from {root:?} is deeper than {limit} levels")]
    TreeTooDeep { root: String, limit: usize },
}

/// A line of the edge list that is not a valid record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedRecord {
    /// 1-based line number in the input text
    pub line: usize,
    /// The line as it appeared in the input
    pub text: String,
    /// Number of comma separated fields found on the line
    pub fields: usize,
}

impl fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {:?} is not a `source,target` pair",
            self.line, self.text
        )?;
        if self.fields != 2 {
            write!(f, " (found {} fields)", self.fields)?;
        } else {
            write!(f, " (empty node id)")?;
        }
        Ok(())
    }
}

fn describe_records(records: &[MalformedRecord]) -> String {
    let lines: Vec<String> = records.iter().map(ToString::to_string).collect();
    format!("malformed edge list: {}", lines.join("; "))
}

/// Where a cycle was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Cycle {
    /// Tree expansion re-entered a node already on the path from the root.
    /// The path ends with the repeated id.
    Path(Vec<String>),

    /// The topological sort ran out of in-degree 0 nodes after emitting
    /// `sorted` of `total` nodes. `members` are the nodes lying on a cycle.
    Stalled {
        sorted: usize,
        total: usize,
        members: Vec<String>,
    },
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cycle::Path(path) => write!(f, "tree path {} loops back", path.join(" -> ")),
            Cycle::Stalled {
                sorted,
                total,
                members,
            } => write!(
                f,
                "topological sort stalled after {sorted} of {total} nodes, cycle through {}",
                members.join(", ")
            ),
        }
    }
}
