//! Critical Path Method (CPM/PERT) schedule engine.
//!
//! Given task durations and predecessor names, computes earliest/latest start and
//! finish times, float, and the critical path. The pipeline is:
//! graph building, topological sort, forward pass, backward pass, critical path
//! extraction. `compute_schedule` runs it in one call; `ScheduleSession` runs it
//! step by step over an editable task list.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::prelude::*;

pub mod logging;

pub mod backward_pass;
mod config;
pub mod critical_path;
pub mod forward_pass;
pub mod graph;
pub mod interner;
mod models;
pub mod optimizer;
pub mod schedule;
pub mod sorting;

pub use backward_pass::{backward_pass, BackwardPassError, BackwardPassResult, LatestTimes};
pub use config::ScheduleConfig;
pub use critical_path::{extract_critical_path, CriticalPathResult};
pub use forward_pass::{forward_pass, EarliestTimes, ForwardPassError, ForwardPassResult};
pub use graph::{parse_predecessors, TaskGraph};
pub use models::{ScheduleResult, ScheduledTask, Task};
pub use optimizer::{
    OptimizeRequest, OptimizeResponse, OptimizerError, OptimizerTask, ScheduleOptimizer,
};
pub use schedule::{compute_schedule, ScheduleError, ScheduleSession, ScheduleState};
pub use sorting::{topological_sort, TopologicalOrder};

/// Compute the full CPM schedule for a list of tasks.
///
/// # Arguments
/// * `tasks` - Tasks with name, duration and comma-separated predecessors
/// * `config` - Optional configuration (tolerance, separator, verbosity)
///
/// # Returns
/// * ScheduleResult with per-task times, float, critical flags and the critical
///   path. A cyclic task list is reported through `is_cyclic`, not raised.
#[pyfunction]
#[pyo3(name = "compute_schedule", signature = (tasks, config=None))]
fn py_compute_schedule(tasks: Vec<Task>, config: Option<ScheduleConfig>) -> ScheduleResult {
    compute_schedule(&tasks, &config.unwrap_or_default())
}

/// Split a comma-separated predecessor field into names.
#[pyfunction]
#[pyo3(name = "parse_predecessors")]
fn py_parse_predecessors(field: &str) -> Vec<String> {
    parse_predecessors(field)
}

/// The pert.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<Task>()?;
    m.add_class::<ScheduledTask>()?;
    m.add_class::<ScheduleResult>()?;

    // Config types
    m.add_class::<ScheduleConfig>()?;

    // Stepwise session
    m.add_class::<ScheduleSession>()?;
    m.add_class::<ScheduleState>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(py_compute_schedule, m)?)?;
    m.add_function(wrap_pyfunction!(py_parse_predecessors, m)?)?;

    Ok(())
}
