//! Configuration for schedule computation.

use pyo3::prelude::*;

/// Tuning knobs shared by every stage of the pipeline.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleConfig {
    /// A task whose |float| is below this value counts as zero-float.
    #[pyo3(get, set)]
    pub critical_tolerance: f64,
    /// Separator used to build the critical path label.
    #[pyo3(get, set)]
    pub path_separator: String,
    /// Upper bound on enumerated start-to-end critical chains.
    #[pyo3(get, set)]
    pub max_critical_chains: usize,
    /// Verbosity level: 0=silent, 1=summary, 2=steps, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            critical_tolerance: 0.001,
            path_separator: " - ".to_string(),
            max_critical_chains: 64,
            verbosity: 0,
        }
    }
}

impl ScheduleConfig {
    /// Whether two times are equal within the critical tolerance.
    #[inline]
    pub fn same_time(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.critical_tolerance
    }

    /// Whether a float value counts as zero.
    #[inline]
    pub fn is_zero_float(&self, slack: f64) -> bool {
        slack.abs() < self.critical_tolerance
    }
}

#[pymethods]
impl ScheduleConfig {
    #[new]
    #[pyo3(signature = (
        critical_tolerance=None,
        path_separator=None,
        max_critical_chains=None,
        verbosity=None
    ))]
    fn new(
        critical_tolerance: Option<f64>,
        path_separator: Option<String>,
        max_critical_chains: Option<usize>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            critical_tolerance: critical_tolerance.unwrap_or(defaults.critical_tolerance),
            path_separator: path_separator.unwrap_or(defaults.path_separator),
            max_critical_chains: max_critical_chains.unwrap_or(defaults.max_critical_chains),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleConfig(critical_tolerance={}, path_separator={:?}, max_critical_chains={}, verbosity={})",
            self.critical_tolerance, self.path_separator, self.max_critical_chains, self.verbosity
        )
    }
}
