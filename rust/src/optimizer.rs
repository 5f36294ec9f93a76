//! Contract with the external schedule optimizer.
//!
//! The optimizer is an outside service (typically a language model) that
//! receives the current task list and answers with a reworked list plus a
//! plain-language summary. Nothing here judges the quality of the answer: the
//! returned tasks simply go back through the normal pipeline, so a cyclic or
//! half-resolved answer is caught by the regular cycle check.

use pyo3::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Task;

/// Errors raised while talking to the optimizer.
#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("Optimizer request failed: {0}")]
    Service(String),
    #[error("Malformed optimizer payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// One task on the optimizer wire format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizerTask {
    pub name: String,
    pub duration: f64,
    #[serde(default)]
    pub predecessors: Vec<String>,
}

impl From<&Task> for OptimizerTask {
    fn from(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            duration: task.duration,
            predecessors: task.predecessor_names(),
        }
    }
}

impl From<OptimizerTask> for Task {
    fn from(task: OptimizerTask) -> Self {
        Task {
            name: task.name,
            duration: task.duration,
            predecessors: task.predecessors.join(","),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    pub tasks: Vec<OptimizerTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_description: Option<String>,
}

impl OptimizeRequest {
    pub fn from_tasks(tasks: &[Task], project_description: Option<String>) -> Self {
        Self {
            tasks: tasks.iter().map(OptimizerTask::from).collect(),
            project_description,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeResponse {
    pub optimized_tasks: Vec<OptimizerTask>,
    #[serde(default)]
    pub summary: String,
}

impl OptimizeResponse {
    /// Convert the returned tasks back into input records.
    pub fn into_tasks(self) -> (Vec<Task>, String) {
        let tasks = self.optimized_tasks.into_iter().map(Task::from).collect();
        (tasks, self.summary)
    }
}

/// A service that proposes a reworked schedule.
///
/// The call is a single blocking request/response; timeouts and retries are the
/// implementor's business.
pub trait ScheduleOptimizer {
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizeResponse, OptimizerError>;
}

impl<F> ScheduleOptimizer for F
where
    F: Fn(&OptimizeRequest) -> Result<OptimizeResponse, OptimizerError>,
{
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizeResponse, OptimizerError> {
        self(request)
    }
}

/// Optimizer backed by a Python callable taking and returning JSON text.
pub struct PyCallableOptimizer {
    callable: PyObject,
}

impl PyCallableOptimizer {
    pub fn new(callable: PyObject) -> Self {
        Self { callable }
    }
}

impl ScheduleOptimizer for PyCallableOptimizer {
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizeResponse, OptimizerError> {
        let payload = serde_json::to_string(request)?;
        let reply: String = Python::with_gil(|py| -> PyResult<String> {
            let reply = self.callable.call1(py, (payload,))?;
            reply.extract(py)
        })
        .map_err(|e| OptimizerError::Service(e.to_string()))?;
        Ok(serde_json::from_str(&reply)?)
    }
}
