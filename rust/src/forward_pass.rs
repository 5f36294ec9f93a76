//! Forward pass: earliest start and finish times.

use thiserror::Error;

use crate::config::ScheduleConfig;
use crate::graph::TaskGraph;
use crate::interner::NodeId;
use crate::log_debug;
use crate::sorting::TopologicalOrder;

/// Errors from the forward pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForwardPassError {
    #[error("Circular dependency detected in task graph")]
    CyclicDependency,
}

/// Earliest times for one task.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EarliestTimes {
    pub earliest_start: f64,
    pub earliest_finish: f64,
}

/// Earliest times for every node, indexed by `NodeId`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ForwardPassResult {
    pub earliest: Vec<Option<EarliestTimes>>,
}

impl ForwardPassResult {
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<EarliestTimes> {
        self.earliest.get(id as usize).copied().flatten()
    }

    /// True when every one of `node_count` nodes has earliest times.
    pub fn covers(&self, node_count: usize) -> bool {
        self.earliest.len() == node_count && self.earliest.iter().all(Option::is_some)
    }
}

/// Compute earliest start/finish for every node in topological order.
///
/// `ES = max(EF of predecessors)`, or 0 for a start task; `EF = ES + duration`.
/// Refuses to run on a cyclic order.
pub fn forward_pass(
    graph: &TaskGraph,
    order: &TopologicalOrder,
    config: &ScheduleConfig,
) -> Result<ForwardPassResult, ForwardPassError> {
    if order.is_cyclic {
        return Err(ForwardPassError::CyclicDependency);
    }

    let mut earliest: Vec<Option<EarliestTimes>> = vec![None; graph.len()];

    for &id in &order.order {
        let idx = id as usize;

        // Topological order guarantees every predecessor is already filled in
        let mut earliest_start: f64 = 0.0;
        for &pred in &graph.predecessors[idx] {
            if let Some(pred_times) = earliest[pred as usize] {
                earliest_start = earliest_start.max(pred_times.earliest_finish);
            }
        }
        let earliest_finish = earliest_start + graph.durations[idx];

        log_debug!(
            config.verbosity,
            "forward {:?}: ES={} EF={}",
            graph.name(id),
            earliest_start,
            earliest_finish
        );

        earliest[idx] = Some(EarliestTimes {
            earliest_start,
            earliest_finish,
        });
    }

    Ok(ForwardPassResult { earliest })
}
