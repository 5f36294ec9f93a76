//! Core data types for schedule computation.

use pyo3::prelude::*;

use crate::graph::parse_predecessors;

/// A task as entered by the user or returned by the optimizer.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub duration: f64,
    /// Comma-separated predecessor names, e.g. `"a, b"`.
    #[pyo3(get, set)]
    pub predecessors: String,
}

#[pymethods]
impl Task {
    #[new]
    #[pyo3(signature = (name, duration=0.0, predecessors=String::new()))]
    pub fn new(name: String, duration: f64, predecessors: String) -> Self {
        Self {
            name,
            duration,
            predecessors,
        }
    }

    /// Predecessor names as trimmed, non-empty, de-duplicated tokens.
    pub fn predecessor_names(&self) -> Vec<String> {
        parse_predecessors(&self.predecessors)
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(name={:?}, duration={}, predecessors={:?})",
            self.name, self.duration, self.predecessors
        )
    }
}

/// A task annotated with the values computed so far.
///
/// Times stay `None` until the pass that produces them has run, and for every
/// task of a cyclic graph.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledTask {
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub duration: f64,
    /// Resolvable predecessor names, in the order they were written.
    #[pyo3(get)]
    pub predecessors: Vec<String>,
    /// Names of tasks that list this one as a predecessor.
    #[pyo3(get)]
    pub successors: Vec<String>,
    #[pyo3(get)]
    pub earliest_start: Option<f64>,
    #[pyo3(get)]
    pub earliest_finish: Option<f64>,
    #[pyo3(get)]
    pub latest_start: Option<f64>,
    #[pyo3(get)]
    pub latest_finish: Option<f64>,
    /// Total float (LS - ES).
    #[pyo3(get, name = "float")]
    pub slack: Option<f64>,
    #[pyo3(get)]
    pub is_critical: bool,
}

#[pymethods]
impl ScheduledTask {
    fn __repr__(&self) -> String {
        format!(
            "ScheduledTask(name={:?}, es={:?}, ef={:?}, ls={:?}, lf={:?}, float={:?}, critical={})",
            self.name,
            self.earliest_start,
            self.earliest_finish,
            self.latest_start,
            self.latest_finish,
            self.slack,
            self.is_critical
        )
    }
}

/// Aggregate output of a schedule computation.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScheduleResult {
    /// Annotated tasks: topological order first, then any tasks stuck behind a cycle
    /// in input order.
    #[pyo3(get)]
    pub tasks: Vec<ScheduledTask>,
    /// Names in topological order (only tasks that could be sorted).
    #[pyo3(get)]
    pub sorted_tasks: Vec<String>,
    #[pyo3(get)]
    pub is_cyclic: bool,
    /// Tasks that are part of, or depend on, a dependency cycle.
    #[pyo3(get)]
    pub cyclic_tasks: Vec<String>,
    #[pyo3(get)]
    pub project_finish: Option<f64>,
    /// Every critical task, in topological order.
    #[pyo3(get)]
    pub critical_path: Vec<String>,
    /// `critical_path` joined with the configured separator.
    #[pyo3(get)]
    pub critical_path_label: Option<String>,
    /// Distinct start-to-end tight chains through the critical tasks.
    #[pyo3(get)]
    pub critical_chains: Vec<Vec<String>>,
    /// (task, predecessor name) pairs that did not resolve and were ignored.
    #[pyo3(get)]
    pub unresolved_references: Vec<(String, String)>,
    /// Names defined more than once; only the first definition is used.
    #[pyo3(get)]
    pub duplicate_names: Vec<String>,
}

impl ScheduleResult {
    pub fn find(&self, name: &str) -> Option<&ScheduledTask> {
        self.tasks.iter().find(|t| t.name == name)
    }
}

#[pymethods]
impl ScheduleResult {
    /// Look up one annotated task by name.
    fn task(&self, name: &str) -> Option<ScheduledTask> {
        self.find(name).cloned()
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleResult(tasks={}, cyclic={}, finish={:?}, critical_path={:?})",
            self.tasks.len(),
            self.is_cyclic,
            self.project_finish,
            self.critical_path_label
        )
    }
}
