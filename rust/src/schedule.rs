//! Schedule orchestration: the full pipeline and the stepwise session.

use pyo3::prelude::*;
use thiserror::Error;

use crate::backward_pass::{backward_pass, BackwardPassError, BackwardPassResult};
use crate::config::ScheduleConfig;
use crate::critical_path::{extract_critical_path, CriticalPathResult};
use crate::forward_pass::{forward_pass, ForwardPassError, ForwardPassResult};
use crate::graph::TaskGraph;
use crate::interner::NodeId;
use crate::models::{ScheduleResult, ScheduledTask, Task};
use crate::optimizer::{OptimizeRequest, OptimizerError, ScheduleOptimizer};
use crate::sorting::{topological_sort, TopologicalOrder};
use crate::{log_steps, log_summary};

/// Errors surfaced by the orchestrator.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Circular dependency detected among tasks: {}", .tasks.join(", "))]
    CyclicDependency { tasks: Vec<String> },
    #[error("Prerequisite not met: {0}")]
    PrerequisiteNotMet(String),
    #[error("Schedule optimization failed: {0}")]
    OptimizerFailure(#[from] OptimizerError),
    #[error("Task not found: {0}")]
    TaskNotFound(String),
}

impl From<BackwardPassError> for ScheduleError {
    fn from(err: BackwardPassError) -> Self {
        match err {
            BackwardPassError::CyclicDependency => {
                ScheduleError::CyclicDependency { tasks: Vec::new() }
            }
            BackwardPassError::PrerequisiteNotMet(name) => ScheduleError::PrerequisiteNotMet(
                format!("earliest times missing for task {name:?}"),
            ),
        }
    }
}

impl From<ForwardPassError> for ScheduleError {
    fn from(err: ForwardPassError) -> Self {
        match err {
            ForwardPassError::CyclicDependency => {
                ScheduleError::CyclicDependency { tasks: Vec::new() }
            }
        }
    }
}

/// Progress of a session through the two passes.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScheduleState {
    Uncomputed,
    EarliestComputed,
    LatestComputed,
}

/// Graph and order derived from one snapshot of the task list.
#[derive(Clone, Debug, Default)]
struct Analysis {
    graph: TaskGraph,
    order: TopologicalOrder,
}

impl Analysis {
    fn new(tasks: &[Task], config: &ScheduleConfig) -> Self {
        let graph = TaskGraph::build(tasks, config);
        let order = topological_sort(&graph);
        if order.is_cyclic {
            log_summary!(
                config.verbosity,
                "Cyclic dependency: {} of {} task(s) could not be ordered",
                graph.len() - order.order.len(),
                graph.len()
            );
        }
        Self { graph, order }
    }

    fn cyclic_tasks(&self) -> Vec<String> {
        self.graph.names_of(&self.order.unsorted(self.graph.len()))
    }

    /// Assemble the public result from whatever passes have run.
    fn result(
        &self,
        forward: Option<&ForwardPassResult>,
        backward: Option<&BackwardPassResult>,
        critical: Option<&CriticalPathResult>,
        config: &ScheduleConfig,
    ) -> ScheduleResult {
        let graph = &self.graph;
        let unsorted = self.order.unsorted(graph.len());

        let annotate = |id: NodeId| {
            let idx = id as usize;
            let earliest = forward.and_then(|f| f.get(id));
            let latest = backward.and_then(|b| b.get(id));
            ScheduledTask {
                name: graph.name(id).to_string(),
                duration: graph.durations[idx],
                predecessors: graph.names_of(&graph.predecessors[idx]),
                successors: graph.names_of(&graph.successors[idx]),
                earliest_start: earliest.map(|t| t.earliest_start),
                earliest_finish: earliest.map(|t| t.earliest_finish),
                latest_start: latest.map(|t| t.latest_start),
                latest_finish: latest.map(|t| t.latest_finish),
                slack: latest.map(|t| t.slack),
                is_critical: critical.is_some_and(|c| c.is_critical(id)),
            }
        };

        let tasks = self
            .order
            .order
            .iter()
            .chain(unsorted.iter())
            .map(|&id| annotate(id))
            .collect();

        let critical_path = critical.map(|c| graph.names_of(&c.path)).unwrap_or_default();
        let critical_path_label = critical.map(|_| critical_path.join(&config.path_separator));
        let critical_chains: Vec<Vec<String>> = critical
            .map(|c| c.chains.iter().map(|chain| graph.names_of(chain)).collect())
            .unwrap_or_default();

        ScheduleResult {
            tasks,
            sorted_tasks: graph.names_of(&self.order.order),
            is_cyclic: self.order.is_cyclic,
            cyclic_tasks: graph.names_of(&unsorted),
            project_finish: backward.map(|b| b.project_finish),
            critical_path,
            critical_path_label,
            critical_chains,
            unresolved_references: graph.unresolved_references.clone(),
            duplicate_names: graph.duplicate_names.clone(),
        }
    }
}

/// Run the full pipeline on a task list.
///
/// Build the graph, sort it, run both passes and extract the critical path. The
/// function keeps no state between calls: callers own the task list and call
/// again after every edit. A cyclic task list is not an error here; the result
/// carries `is_cyclic` and leaves every time unset.
pub fn compute_schedule(tasks: &[Task], config: &ScheduleConfig) -> ScheduleResult {
    let analysis = Analysis::new(tasks, config);
    if analysis.order.is_cyclic {
        return analysis.result(None, None, None, config);
    }

    // Neither pass can fail on an acyclic order with a complete forward pass
    let Ok(forward) = forward_pass(&analysis.graph, &analysis.order, config) else {
        return analysis.result(None, None, None, config);
    };
    let Ok(backward) = backward_pass(&analysis.graph, &analysis.order, &forward, config) else {
        return analysis.result(Some(&forward), None, None, config);
    };
    let critical = extract_critical_path(
        &analysis.graph,
        &analysis.order,
        &forward,
        &backward,
        config,
    );

    analysis.result(Some(&forward), Some(&backward), Some(&critical), config)
}

/// Editable task list driven through the `Uncomputed -> EarliestComputed ->
/// LatestComputed` steps.
///
/// Every edit throws away computed values and returns to `Uncomputed`. A cyclic
/// task list is a standing condition: both steps refuse to run until the cycle
/// is edited away.
#[pyclass]
#[derive(Clone, Debug)]
pub struct ScheduleSession {
    tasks: Vec<Task>,
    config: ScheduleConfig,
    state: ScheduleState,
    analysis: Analysis,
    forward: Option<ForwardPassResult>,
    backward: Option<BackwardPassResult>,
    critical: Option<CriticalPathResult>,
}

impl ScheduleSession {
    pub fn with_config(tasks: Vec<Task>, config: ScheduleConfig) -> Self {
        let analysis = Analysis::new(&tasks, &config);
        Self {
            tasks,
            config,
            state: ScheduleState::Uncomputed,
            analysis,
            forward: None,
            backward: None,
            critical: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn state(&self) -> ScheduleState {
        self.state
    }

    pub fn is_cyclic(&self) -> bool {
        self.analysis.order.is_cyclic
    }

    pub fn cyclic_tasks(&self) -> Vec<String> {
        self.analysis.cyclic_tasks()
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Replace the whole task list.
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.reset();
    }

    pub fn add_task(&mut self, task: Task) {
        self.tasks.push(task);
        self.reset();
    }

    /// Remove the first task with this name.
    pub fn remove_task(&mut self, name: &str) -> Result<Task, ScheduleError> {
        let pos = self.position(name)?;
        let removed = self.tasks.remove(pos);
        self.reset();
        Ok(removed)
    }

    /// Replace the first task with this name (the replacement may rename it).
    pub fn replace_task(&mut self, name: &str, task: Task) -> Result<(), ScheduleError> {
        let pos = self.position(name)?;
        self.tasks[pos] = task;
        self.reset();
        Ok(())
    }

    /// Run the forward pass: `Uncomputed -> EarliestComputed`.
    ///
    /// Re-running from a later state recomputes and drops the latest times.
    pub fn compute_earliest(&mut self) -> Result<(), ScheduleError> {
        if self.is_cyclic() {
            return Err(ScheduleError::CyclicDependency {
                tasks: self.cyclic_tasks(),
            });
        }
        let forward = forward_pass(&self.analysis.graph, &self.analysis.order, &self.config)?;
        self.forward = Some(forward);
        self.backward = None;
        self.critical = None;
        self.transition(ScheduleState::EarliestComputed);
        Ok(())
    }

    /// Run the backward pass and critical path extraction:
    /// `EarliestComputed -> LatestComputed`.
    pub fn compute_latest(&mut self) -> Result<(), ScheduleError> {
        if self.is_cyclic() {
            return Err(ScheduleError::CyclicDependency {
                tasks: self.cyclic_tasks(),
            });
        }
        let Some(forward) = self.forward.as_ref() else {
            return Err(ScheduleError::PrerequisiteNotMet(
                "earliest times have not been computed".to_string(),
            ));
        };
        let graph = &self.analysis.graph;
        let order = &self.analysis.order;
        let backward = backward_pass(graph, order, forward, &self.config)?;
        let critical = extract_critical_path(graph, order, forward, &backward, &self.config);
        self.backward = Some(backward);
        self.critical = Some(critical);
        self.transition(ScheduleState::LatestComputed);
        Ok(())
    }

    /// Snapshot of the values computed so far.
    pub fn result(&self) -> ScheduleResult {
        self.analysis.result(
            self.forward.as_ref(),
            self.backward.as_ref(),
            self.critical.as_ref(),
            &self.config,
        )
    }

    /// Ask an optimizer for a reworked task list and adopt it.
    ///
    /// On success the returned tasks replace the current ones (going back to
    /// `Uncomputed`) and the optimizer's summary is returned. On failure the
    /// session is left exactly as it was.
    pub fn apply_optimizer(
        &mut self,
        optimizer: &dyn ScheduleOptimizer,
        project_description: Option<String>,
    ) -> Result<String, ScheduleError> {
        let request = OptimizeRequest::from_tasks(&self.tasks, project_description);
        let response = optimizer.optimize(&request).map_err(|err| {
            log_summary!(self.config.verbosity, "Optimizer failed: {}", err);
            ScheduleError::OptimizerFailure(err)
        })?;

        let (tasks, summary) = response.into_tasks();
        log_summary!(
            self.config.verbosity,
            "Optimizer returned {} task(s)",
            tasks.len()
        );
        self.set_tasks(tasks);
        Ok(summary)
    }

    fn position(&self, name: &str) -> Result<usize, ScheduleError> {
        self.tasks
            .iter()
            .position(|t| t.name == name)
            .ok_or_else(|| ScheduleError::TaskNotFound(name.to_string()))
    }

    fn reset(&mut self) {
        self.analysis = Analysis::new(&self.tasks, &self.config);
        self.forward = None;
        self.backward = None;
        self.critical = None;
        self.transition(ScheduleState::Uncomputed);
    }

    fn transition(&mut self, next: ScheduleState) {
        if self.state != next {
            log_steps!(self.config.verbosity, "State {:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }
}

#[pymethods]
impl ScheduleSession {
    #[new]
    #[pyo3(signature = (tasks=Vec::new(), config=None))]
    pub fn new(tasks: Vec<Task>, config: Option<ScheduleConfig>) -> Self {
        Self::with_config(tasks, config.unwrap_or_default())
    }

    #[pyo3(name = "tasks")]
    fn py_tasks(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    #[pyo3(name = "state")]
    fn py_state(&self) -> ScheduleState {
        self.state
    }

    #[pyo3(name = "is_cyclic")]
    fn py_is_cyclic(&self) -> bool {
        self.is_cyclic()
    }

    #[pyo3(name = "cyclic_tasks")]
    fn py_cyclic_tasks(&self) -> Vec<String> {
        self.cyclic_tasks()
    }

    #[pyo3(name = "set_tasks")]
    fn py_set_tasks(&mut self, tasks: Vec<Task>) {
        self.set_tasks(tasks);
    }

    #[pyo3(name = "add_task")]
    fn py_add_task(&mut self, task: Task) {
        self.add_task(task);
    }

    #[pyo3(name = "remove_task")]
    fn py_remove_task(&mut self, name: &str) -> PyResult<Task> {
        self.remove_task(name).map_err(to_py_err)
    }

    #[pyo3(name = "replace_task")]
    fn py_replace_task(&mut self, name: &str, task: Task) -> PyResult<()> {
        self.replace_task(name, task).map_err(to_py_err)
    }

    #[pyo3(name = "compute_earliest")]
    fn py_compute_earliest(&mut self) -> PyResult<()> {
        self.compute_earliest().map_err(to_py_err)
    }

    #[pyo3(name = "compute_latest")]
    fn py_compute_latest(&mut self) -> PyResult<()> {
        self.compute_latest().map_err(to_py_err)
    }

    #[pyo3(name = "result")]
    fn py_result(&self) -> ScheduleResult {
        self.result()
    }

    /// Call `optimizer(request_json) -> response_json` and adopt its answer.
    #[pyo3(name = "optimize", signature = (optimizer, project_description=None))]
    fn py_optimize(
        &mut self,
        optimizer: PyObject,
        project_description: Option<String>,
    ) -> PyResult<String> {
        let optimizer = crate::optimizer::PyCallableOptimizer::new(optimizer);
        self.apply_optimizer(&optimizer, project_description)
            .map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleSession(tasks={}, state={:?}, cyclic={})",
            self.tasks.len(),
            self.state,
            self.is_cyclic()
        )
    }
}

/// Map orchestrator errors onto Python exceptions.
pub(crate) fn to_py_err(err: ScheduleError) -> PyErr {
    match err {
        ScheduleError::OptimizerFailure(_) => {
            pyo3::exceptions::PyRuntimeError::new_err(err.to_string())
        }
        ScheduleError::TaskNotFound(_) => pyo3::exceptions::PyKeyError::new_err(err.to_string()),
        _ => pyo3::exceptions::PyValueError::new_err(err.to_string()),
    }
}
