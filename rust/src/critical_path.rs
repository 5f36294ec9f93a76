//! Float evaluation and critical path extraction.
//!
//! A task is critical when its float is zero and it sits on a tight chain of
//! zero-float tasks leading to a terminal milestone. A predecessor is on the
//! chain only if its finish exactly gates the current task's start
//! (`EF(pred) == ES(task)`); a zero-float predecessor that finishes earlier
//! belongs to some other chain, or none.

use crate::backward_pass::BackwardPassResult;
use crate::config::ScheduleConfig;
use crate::forward_pass::ForwardPassResult;
use crate::graph::TaskGraph;
use crate::interner::NodeId;
use crate::sorting::TopologicalOrder;
use crate::{log_steps, log_summary};

/// Result of critical path extraction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CriticalPathResult {
    /// Critical flag indexed by `NodeId`.
    pub critical: Vec<bool>,
    /// Critical nodes in topological order.
    pub path: Vec<NodeId>,
    /// Terminal milestones the traversal started from.
    pub end_nodes: Vec<NodeId>,
    /// Distinct start-to-end tight chains, each ordered start first.
    pub chains: Vec<Vec<NodeId>>,
}

impl CriticalPathResult {
    #[inline]
    pub fn is_critical(&self, id: NodeId) -> bool {
        self.critical.get(id as usize).copied().unwrap_or(false)
    }
}

/// Lookup helper over the two pass results.
struct Timings<'a> {
    forward: &'a ForwardPassResult,
    backward: &'a BackwardPassResult,
    config: &'a ScheduleConfig,
}

impl Timings<'_> {
    fn zero_float(&self, id: NodeId) -> bool {
        self.backward
            .get(id)
            .is_some_and(|t| self.config.is_zero_float(t.slack))
    }

    /// `pred` finishes exactly when `node` starts.
    fn is_tight(&self, pred: NodeId, node: NodeId) -> bool {
        match (self.forward.get(pred), self.forward.get(node)) {
            (Some(p), Some(n)) => self.config.same_time(p.earliest_finish, n.earliest_start),
            _ => false,
        }
    }

    fn critical_predecessors<'g>(
        &'g self,
        graph: &'g TaskGraph,
        node: NodeId,
    ) -> impl Iterator<Item = NodeId> + 'g {
        graph.predecessors[node as usize]
            .iter()
            .copied()
            .filter(move |&pred| self.zero_float(pred) && self.is_tight(pred, node))
    }
}

/// Mark critical tasks and reconstruct the critical path.
///
/// The walk starts from every zero-float sink, which are exactly the sinks whose
/// EF equals the project finish, and uses an explicit worklist so that all
/// tight chains are collected, not only the first one found.
pub fn extract_critical_path(
    graph: &TaskGraph,
    order: &TopologicalOrder,
    forward: &ForwardPassResult,
    backward: &BackwardPassResult,
    config: &ScheduleConfig,
) -> CriticalPathResult {
    let timings = Timings {
        forward,
        backward,
        config,
    };
    let n = graph.len();

    let end_nodes: Vec<NodeId> = graph
        .sinks()
        .into_iter()
        .filter(|&id| timings.zero_float(id))
        .collect();

    let mut critical = vec![false; n];
    let mut worklist: Vec<NodeId> = end_nodes.clone();

    while let Some(id) = worklist.pop() {
        let idx = id as usize;
        if critical[idx] || !timings.zero_float(id) {
            continue;
        }
        critical[idx] = true;
        worklist.extend(
            timings
                .critical_predecessors(graph, id)
                .filter(|&pred| !critical[pred as usize]),
        );
    }

    let path: Vec<NodeId> = order
        .order
        .iter()
        .copied()
        .filter(|&id| critical[id as usize])
        .collect();

    let chains = enumerate_chains(graph, &timings, &end_nodes, config.max_critical_chains);

    log_summary!(
        config.verbosity,
        "Critical path: {}",
        graph.names_of(&path).join(&config.path_separator)
    );
    log_steps!(
        config.verbosity,
        "{} critical task(s), {} chain(s)",
        path.len(),
        chains.len()
    );

    CriticalPathResult {
        critical,
        path,
        end_nodes,
        chains,
    }
}

/// Enumerate start-to-end tight chains, depth first, up to `limit` chains.
fn enumerate_chains(
    graph: &TaskGraph,
    timings: &Timings<'_>,
    end_nodes: &[NodeId],
    limit: usize,
) -> Vec<Vec<NodeId>> {
    let mut chains: Vec<Vec<NodeId>> = Vec::new();

    // Each entry holds a partial chain walked backward from an end node
    let mut stack: Vec<Vec<NodeId>> = end_nodes.iter().rev().map(|&id| vec![id]).collect();

    while let Some(partial) = stack.pop() {
        if chains.len() >= limit {
            break;
        }
        let Some(&head) = partial.last() else {
            continue;
        };

        let preds: Vec<NodeId> = timings.critical_predecessors(graph, head).collect();
        if preds.is_empty() {
            let mut chain = partial;
            chain.reverse();
            chains.push(chain);
            continue;
        }

        for &pred in preds.iter().rev() {
            let mut next = partial.clone();
            next.push(pred);
            stack.push(next);
        }
    }

    chains
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backward_pass::backward_pass;
    use crate::forward_pass::forward_pass;
    use crate::models::Task;
    use crate::sorting::topological_sort;

    fn make_task(name: &str, duration: f64, preds: &str) -> Task {
        Task::new(name.to_string(), duration, preds.to_string())
    }

    fn run_with(tasks: &[Task], config: &ScheduleConfig) -> (TaskGraph, CriticalPathResult) {
        let graph = TaskGraph::build(tasks, config);
        let order = topological_sort(&graph);
        let forward = forward_pass(&graph, &order, config).unwrap();
        let backward = backward_pass(&graph, &order, &forward, config).unwrap();
        let result = extract_critical_path(&graph, &order, &forward, &backward, config);
        (graph, result)
    }

    fn run(tasks: &[Task]) -> (TaskGraph, CriticalPathResult) {
        run_with(tasks, &ScheduleConfig::default())
    }

    fn chain_names(graph: &TaskGraph, result: &CriticalPathResult) -> Vec<Vec<String>> {
        result.chains.iter().map(|c| graph.names_of(c)).collect()
    }

    #[test]
    fn test_serial_chain_fully_critical() {
        let (graph, result) = run(&[
            make_task("A", 7.0, ""),
            make_task("B", 7.0, "A"),
            make_task("C", 15.0, "B"),
        ]);

        assert_eq!(graph.names_of(&result.path), vec!["A", "B", "C"]);
        assert_eq!(chain_names(&graph, &result), vec![vec!["A", "B", "C"]]);
        assert_eq!(graph.names_of(&result.end_nodes), vec!["C"]);
    }

    #[test]
    fn test_parallel_branch_shorter_not_critical() {
        let (graph, result) = run(&[
            make_task("D", 0.0, ""),
            make_task("E", 10.0, "D"),
            make_task("F", 5.0, "D"),
            make_task("G", 3.0, "E,F"),
        ]);

        let id = |name: &str| graph.index.get(name).unwrap();
        assert!(result.is_critical(id("E")));
        assert!(!result.is_critical(id("F")));
        assert_eq!(graph.names_of(&result.path), vec!["D", "E", "G"]);
    }

    #[test]
    fn test_diamond_equal_branches_both_critical() {
        let (graph, result) = run(&[
            make_task("A", 2.0, ""),
            make_task("B", 4.0, "A"),
            make_task("C", 4.0, "A"),
            make_task("D", 1.0, "B,C"),
        ]);

        assert_eq!(graph.names_of(&result.path), vec!["A", "B", "C", "D"]);
        assert_eq!(
            chain_names(&graph, &result),
            vec![vec!["A", "B", "D"], vec!["A", "C", "D"]]
        );
    }

    #[test]
    fn test_chains_only_follow_tight_edges() {
        // p is critical through u, but finishes at 2 while t starts at 5, so no
        // chain may go p -> t.
        let (graph, result) = run(&[
            make_task("s", 0.0, ""),
            make_task("p", 2.0, "s"),
            make_task("q", 5.0, "s"),
            make_task("t", 1.0, "p,q"),
            make_task("u", 4.0, "p"),
        ]);

        let id = |name: &str| graph.index.get(name).unwrap();
        assert!(result.is_critical(id("p")));
        assert!(result.is_critical(id("u")));
        assert_eq!(graph.names_of(&result.end_nodes), vec!["t", "u"]);
        assert_eq!(
            chain_names(&graph, &result),
            vec![vec!["s", "q", "t"], vec!["s", "p", "u"]]
        );
    }

    #[test]
    fn test_sink_with_float_not_an_end_node() {
        let (graph, result) = run(&[
            make_task("a", 4.0, ""),
            make_task("b", 6.0, "a"),
            make_task("x", 3.0, ""),
        ]);

        assert_eq!(graph.names_of(&result.end_nodes), vec!["b"]);
        assert!(!result.is_critical(graph.index.get("x").unwrap()));
    }

    #[test]
    fn test_chain_limit() {
        // Three equal branches, cap at two chains
        let config = ScheduleConfig {
            max_critical_chains: 2,
            ..ScheduleConfig::default()
        };
        let (graph, result) = run_with(
            &[
                make_task("s", 1.0, ""),
                make_task("x", 2.0, "s"),
                make_task("y", 2.0, "s"),
                make_task("z", 2.0, "s"),
                make_task("e", 1.0, "x,y,z"),
            ],
            &config,
        );

        assert_eq!(result.chains.len(), 2);
        assert_eq!(result.path.len(), 5);
        assert_eq!(chain_names(&graph, &result)[0], vec!["s", "x", "e"]);
    }

    #[test]
    fn test_empty_graph() {
        let (_, result) = run(&[]);
        assert!(result.path.is_empty());
        assert!(result.chains.is_empty());
    }
}
