//! Topological ordering of the task graph.

use std::collections::VecDeque;

use crate::graph::TaskGraph;
use crate::interner::NodeId;

/// Result of Kahn's algorithm over a task graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologicalOrder {
    /// Nodes such that every node follows all of its predecessors.
    pub order: Vec<NodeId>,
    /// True when some nodes could not be ordered because of a cycle.
    pub is_cyclic: bool,
}

impl TopologicalOrder {
    /// Position of each node in `order` (None for nodes left out by a cycle).
    pub fn positions(&self, node_count: usize) -> Vec<Option<usize>> {
        let mut positions = vec![None; node_count];
        for (pos, &id) in self.order.iter().enumerate() {
            positions[id as usize] = Some(pos);
        }
        positions
    }

    /// Nodes that never reached zero in-degree, in input order.
    pub fn unsorted(&self, node_count: usize) -> Vec<NodeId> {
        let positions = self.positions(node_count);
        (0..node_count)
            .filter(|&idx| positions[idx].is_none())
            .map(|idx| idx as NodeId)
            .collect()
    }
}

/// Perform topological sort of the graph using Kahn's algorithm.
///
/// In-degree counts resolved predecessors only. Ready nodes are processed FIFO,
/// seeded in input order, so ties break by input position. Nodes on a cycle,
/// or downstream of one, never reach zero in-degree and are left out.
pub fn topological_sort(graph: &TaskGraph) -> TopologicalOrder {
    let n = graph.len();
    let mut in_degree: Vec<usize> = graph.predecessors.iter().map(Vec::len).collect();

    let mut queue: VecDeque<NodeId> = (0..n)
        .filter(|&idx| in_degree[idx] == 0)
        .map(|idx| idx as NodeId)
        .collect();

    let mut order: Vec<NodeId> = Vec::with_capacity(n);

    while let Some(id) = queue.pop_front() {
        order.push(id);

        for &succ in &graph.successors[id as usize] {
            let degree = &mut in_degree[succ as usize];
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(succ);
            }
        }
    }

    let is_cyclic = order.len() != n;
    TopologicalOrder { order, is_cyclic }
}
