use crate::{Cycle, GraphModel, LayoutEngine, LayoutError, Node};
use derive_more::Deref;
use petgraph::algo::tarjan_scc;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::debug;

/// Nodes in one topological order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deref)]
pub struct SortedSequence(Vec<Node>);

impl SortedSequence {
    pub fn ids(&self) -> Vec<&str> {
        self.0.iter().map(|node| node.id.as_str()).collect()
    }

    /// Position of `id` in the sequence
    pub fn position(&self, id: &str) -> Option<usize> {
        self.0.iter().position(|node| node.id == id)
    }

    pub fn into_inner(self) -> Vec<Node> {
        self.0
    }
}

/// Kahn's algorithm over the model's nodes and edges
///
/// Nodes with no incoming edge are taken in first-seen order, and a node
/// freed by removing an edge is queued behind them in edge order. Edges with
/// an endpoint outside the node set take no part in the sort.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologicalSorter;

impl LayoutEngine for TopologicalSorter {
    type Output = SortedSequence;

    fn build(&self, model: &GraphModel) -> Result<SortedSequence, LayoutError> {
        let total = model.node_count();
        let successors = model.successors();

        let mut in_degree = vec![0usize; total];
        for (_, target) in model.resolved_edges() {
            in_degree[target] += 1;
        }

        let mut queue: VecDeque<usize> = (0..total).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(total);

        while let Some(index) = queue.pop_front() {
            order.push(index);
            for &target in &successors[index] {
                in_degree[target] -= 1;
                if in_degree[target] == 0 {
                    queue.push_back(target);
                }
            }
        }

        if order.len() < total {
            let members = cycle_members(model);
            debug!(
                "Sort stalled after {} of {total} nodes, cycle through {members:?}",
                order.len()
            );
            return Err(LayoutError::CycleDetected(Cycle::Stalled {
                sorted: order.len(),
                total,
                members,
            }));
        }

        let nodes = model.nodes();
        Ok(SortedSequence(
            order.into_iter().map(|index| nodes[index].clone()).collect(),
        ))
    }
}

/// Ids of the nodes lying on a cycle, in node order
fn cycle_members(model: &GraphModel) -> Vec<String> {
    let graph = model.to_graph();
    let mut members: Vec<_> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| match component.as_slice() {
            [single] => graph.contains_edge(*single, *single),
            _ => true,
        })
        .flatten()
        .collect();
    members.sort();
    members.into_iter().map(|index| graph[index].to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, Edge};
    use test_log::test;

    fn sort(text: &str) -> Result<SortedSequence, LayoutError> {
        TopologicalSorter.build(&parse(text).unwrap())
    }

    #[test]
    fn test_sources_first_then_freed_nodes() {
        let sorted = sort("A,B\nA,C\nB,D").unwrap();
        assert_eq!(sorted.ids(), ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_ties_follow_first_seen_order() {
        let sorted = sort("C,D\nA,B").unwrap();
        assert_eq!(sorted.ids(), ["C", "A", "D", "B"]);
    }

    #[test]
    fn test_order_respects_every_edge() {
        let text = "shirt,tie\ntie,jacket\ntrousers,shoes\nsocks,shoes\n\
                    trousers,belt\nbelt,jacket\nshirt,belt\nundershorts,trousers\n\
                    undershorts,shoes";
        let model = parse(text).unwrap();
        let sorted = TopologicalSorter.build(&model).unwrap();

        assert_eq!(sorted.len(), model.node_count());
        for edge in model.edges() {
            assert!(
                sorted.position(&edge.source) < sorted.position(&edge.target),
                "{edge:?} is out of order in {:?}",
                sorted.ids()
            );
        }
    }

    #[test]
    fn test_sort_is_deterministic() {
        let text = "E,F\nA,F\nB,F\nF,G\nC,G\nD,A";
        let first = sort(text).unwrap();
        for _ in 0..10 {
            assert_eq!(sort(text).unwrap(), first);
        }
    }

    #[test]
    fn test_duplicate_edges() {
        let sorted = sort("A,B\nA,B\nB,C").unwrap();
        assert_eq!(sorted.ids(), ["A", "B", "C"]);
    }

    #[test]
    fn test_cycle_is_reported_not_truncated() {
        let err = sort("A,B\nB,C\nC,A").unwrap_err();
        assert_eq!(
            err,
            LayoutError::CycleDetected(Cycle::Stalled {
                sorted: 0,
                total: 3,
                members: vec!["A".into(), "B".into(), "C".into()],
            })
        );
    }

    #[test]
    fn test_cycle_members_exclude_blocked_descendants() {
        let err = sort("X,A\nA,B\nB,A\nB,C").unwrap_err();
        assert_eq!(
            err,
            LayoutError::CycleDetected(Cycle::Stalled {
                sorted: 1,
                total: 4,
                members: vec!["A".into(), "B".into()],
            })
        );
    }

    #[test]
    fn test_self_loop_stalls_the_sort() {
        let err = sort("A,A\nA,B").unwrap_err();
        assert_eq!(
            err,
            LayoutError::CycleDetected(Cycle::Stalled {
                sorted: 0,
                total: 2,
                members: vec!["A".into()],
            })
        );
    }

    #[test]
    fn test_empty_graph_sorts_to_empty_sequence() {
        let sorted = TopologicalSorter.build(&GraphModel::new()).unwrap();
        assert!(sorted.is_empty());
    }

    #[test]
    fn test_dangling_edges_do_not_block_targets() {
        let model = GraphModel::from_parts(
            ["A", "B"].map(Node::from),
            [
                Edge::new("Z".into(), "A".into()),
                Edge::new("A".into(), "B".into()),
            ],
        );

        let sorted = TopologicalSorter.build(&model).unwrap();
        assert_eq!(sorted.into_inner(), [Node::from("A"), Node::from("B")]);
    }
}
