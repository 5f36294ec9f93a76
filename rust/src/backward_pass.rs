//! Backward pass: latest start/finish times and float.

use thiserror::Error;

use crate::config::ScheduleConfig;
use crate::forward_pass::ForwardPassResult;
use crate::graph::TaskGraph;
use crate::interner::NodeId;
use crate::sorting::TopologicalOrder;
use crate::{log_debug, log_summary};

/// Error types for backward pass processing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackwardPassError {
    /// Circular dependency detected in task graph.
    #[error("Circular dependency detected in task graph")]
    CyclicDependency,
    /// Earliest times are missing for at least one task.
    #[error("Earliest times must be computed for all tasks first (missing: {0})")]
    PrerequisiteNotMet(String),
}

/// Latest times and float for one task.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LatestTimes {
    pub latest_start: f64,
    pub latest_finish: f64,
    /// Slack = latest_start - earliest_start.
    pub slack: f64,
}

/// Result from the backward pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BackwardPassResult {
    /// Latest times indexed by `NodeId`.
    pub latest: Vec<Option<LatestTimes>>,
    /// Finish time every sink is anchored to.
    pub project_finish: f64,
}

impl BackwardPassResult {
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<LatestTimes> {
        self.latest.get(id as usize).copied().flatten()
    }
}

/// Project finish date: max EF over sink tasks, or over all tasks when there is
/// no sink.
pub fn project_finish_date(graph: &TaskGraph, forward: &ForwardPassResult) -> f64 {
    let finish_of = |id: NodeId| forward.get(id).map(|t| t.earliest_finish);

    let sinks = graph.sinks();
    let anchored = sinks
        .iter()
        .filter_map(|&id| finish_of(id))
        .fold(None, |acc: Option<f64>, ef| Some(acc.map_or(ef, |m| m.max(ef))));

    anchored.unwrap_or_else(|| {
        (0..graph.len())
            .filter_map(|idx| finish_of(idx as NodeId))
            .fold(0.0, f64::max)
    })
}

/// Calculate latest finish/start and float for every task.
///
/// Works through the topological order in reverse, so every successor's latest
/// start is known before its predecessors are visited:
/// `LF = min(LS of successors)` or the project finish for a sink,
/// `LS = LF - duration`, `float = LS - ES`.
///
/// # Returns
/// * `Err(BackwardPassError::CyclicDependency)` if the order is cyclic
/// * `Err(BackwardPassError::PrerequisiteNotMet)` if the forward pass has not
///   covered every task
pub fn backward_pass(
    graph: &TaskGraph,
    order: &TopologicalOrder,
    forward: &ForwardPassResult,
    config: &ScheduleConfig,
) -> Result<BackwardPassResult, BackwardPassError> {
    if order.is_cyclic {
        return Err(BackwardPassError::CyclicDependency);
    }
    if !forward.covers(graph.len()) {
        let missing = (0..graph.len())
            .map(|idx| idx as NodeId)
            .find(|&id| forward.get(id).is_none())
            .map(|id| graph.name(id).to_string())
            .unwrap_or_else(|| "<stale forward pass>".to_string());
        return Err(BackwardPassError::PrerequisiteNotMet(missing));
    }

    let project_finish = project_finish_date(graph, forward);
    log_summary!(config.verbosity, "Project finish: {}", project_finish);

    let mut latest: Vec<Option<LatestTimes>> = vec![None; graph.len()];

    for &id in order.order.iter().rev() {
        let idx = id as usize;

        let mut latest_finish = f64::MAX;
        for &succ in &graph.successors[idx] {
            if let Some(succ_times) = latest[succ as usize] {
                latest_finish = latest_finish.min(succ_times.latest_start);
            }
        }
        if latest_finish == f64::MAX {
            // No successors, anchor to the project finish
            latest_finish = project_finish;
        }

        let latest_start = latest_finish - graph.durations[idx];
        let earliest_start = forward.get(id).map_or(0.0, |t| t.earliest_start);
        let slack = latest_start - earliest_start;

        log_debug!(
            config.verbosity,
            "backward {:?}: LS={} LF={} float={}",
            graph.name(id),
            latest_start,
            latest_finish,
            slack
        );

        latest[idx] = Some(LatestTimes {
            latest_start,
            latest_finish,
            slack,
        });
    }

    Ok(BackwardPassResult {
        latest,
        project_finish,
    })
}
