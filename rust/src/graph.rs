//! Task graph construction from raw task records.

use crate::config::ScheduleConfig;
use crate::interner::{NodeId, TaskNameIndex};
use crate::log_steps;
use crate::models::Task;

/// Split a free-text predecessor field into trimmed, non-empty names.
///
/// Order of first appearance is kept and repeated names are dropped.
pub fn parse_predecessors(field: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for token in field.split(',').map(str::trim) {
        if !token.is_empty() && !names.iter().any(|n| n == token) {
            names.push(token.to_string());
        }
    }
    names
}

/// Directed graph of tasks with edges from predecessor to successor.
///
/// All per-node data is indexed by `NodeId`; nodes are numbered in input order.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    pub index: TaskNameIndex,
    pub durations: Vec<f64>,
    /// Resolved predecessors per node, in the order they were written.
    pub predecessors: Vec<Vec<NodeId>>,
    /// Successors per node, in order of appearance.
    pub successors: Vec<Vec<NodeId>>,
    /// (task, missing predecessor name) pairs that were dropped.
    pub unresolved_references: Vec<(String, String)>,
    /// Names defined more than once; later definitions are ignored.
    pub duplicate_names: Vec<String>,
}

impl TaskGraph {
    /// Build the graph from raw task records.
    ///
    /// Never fails: duplicate names keep their first definition and unknown
    /// predecessor names are dropped.
    pub fn build(tasks: &[Task], config: &ScheduleConfig) -> Self {
        let verbosity = config.verbosity;
        let mut index = TaskNameIndex::with_capacity(tasks.len());
        let mut durations = Vec::with_capacity(tasks.len());
        let mut defining: Vec<&Task> = Vec::with_capacity(tasks.len());
        let mut duplicate_names = Vec::new();

        for task in tasks {
            match index.insert(&task.name) {
                Ok(_) => {
                    durations.push(task.duration);
                    defining.push(task);
                }
                Err(_) => {
                    log_steps!(verbosity, "Ignoring duplicate definition of {:?}", task.name);
                    if !duplicate_names.contains(&task.name) {
                        duplicate_names.push(task.name.clone());
                    }
                }
            }
        }

        let n = index.len();
        let mut predecessors: Vec<Vec<NodeId>> = vec![Vec::new(); n];
        let mut successors: Vec<Vec<NodeId>> = vec![Vec::new(); n];
        let mut unresolved_references = Vec::new();

        for (idx, task) in defining.iter().enumerate() {
            let id = idx as NodeId;
            for pred_name in task.predecessor_names() {
                let Some(pred_id) = index.get(&pred_name) else {
                    log_steps!(
                        verbosity,
                        "Task {:?}: ignoring unknown predecessor {:?}",
                        task.name,
                        pred_name
                    );
                    unresolved_references.push((task.name.clone(), pred_name));
                    continue;
                };
                predecessors[idx].push(pred_id);
                let succ = &mut successors[pred_id as usize];
                if !succ.contains(&id) {
                    succ.push(id);
                }
            }
        }

        Self {
            index,
            durations,
            predecessors,
            successors,
            unresolved_references,
            duplicate_names,
        }
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// Node name; empty string for an out-of-range ID.
    pub fn name(&self, id: NodeId) -> &str {
        self.index.name(id).unwrap_or_default()
    }

    pub fn names_of(&self, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&id| self.name(id).to_string()).collect()
    }

    /// Nodes without successors, in input order.
    pub fn sinks(&self) -> Vec<NodeId> {
        (0..self.len())
            .filter(|&idx| self.successors[idx].is_empty())
            .map(|idx| idx as NodeId)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task(name: &str, duration: f64, preds: &str) -> Task {
        Task::new(name.to_string(), duration, preds.to_string())
    }

    fn build(tasks: &[Task]) -> TaskGraph {
        TaskGraph::build(tasks, &ScheduleConfig::default())
    }

    #[test]
    fn test_parse_predecessors() {
        assert_eq!(parse_predecessors(""), Vec::<String>::new());
        assert_eq!(parse_predecessors(" , ,"), Vec::<String>::new());
        assert_eq!(parse_predecessors("a"), vec!["a"]);
        assert_eq!(parse_predecessors(" r , s "), vec!["r", "s"]);
        assert_eq!(parse_predecessors("u,v,u,w"), vec!["u", "v", "w"]);
    }

    #[test]
    fn test_successors_follow_input_order() {
        let tasks = vec![
            make_task("d", 0.0, ""),
            make_task("h", 60.0, "d"),
            make_task("e", 45.0, "d"),
            make_task("g", 45.0, "d"),
        ];
        let graph = build(&tasks);

        let d = graph.index.get("d").unwrap();
        assert_eq!(graph.names_of(&graph.successors[d as usize]), vec!["h", "e", "g"]);
        assert_eq!(graph.sinks().len(), 3);
    }

    #[test]
    fn test_repeated_predecessor_single_edge() {
        let tasks = vec![make_task("a", 1.0, ""), make_task("b", 1.0, "a, a")];
        let graph = build(&tasks);

        assert_eq!(graph.predecessors[1], vec![0]);
        assert_eq!(graph.successors[0], vec![1]);
    }

    #[test]
    fn test_unresolved_predecessor_dropped() {
        let tasks = vec![make_task("a", 1.0, ""), make_task("b", 2.0, "a, ghost")];
        let graph = build(&tasks);

        assert_eq!(graph.predecessors[1], vec![0]);
        assert_eq!(
            graph.unresolved_references,
            vec![("b".to_string(), "ghost".to_string())]
        );
        assert!(graph.successors.iter().all(|s| s.len() <= 1));
    }

    #[test]
    fn test_duplicate_name_keeps_first() {
        let tasks = vec![
            make_task("a", 1.0, ""),
            make_task("a", 9.0, ""),
            make_task("b", 2.0, "a"),
        ];
        let graph = build(&tasks);

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.durations, vec![1.0, 2.0]);
        assert_eq!(graph.duplicate_names, vec!["a"]);
    }

    #[test]
    fn test_empty_input() {
        let graph = build(&[]);
        assert!(graph.is_empty());
        assert!(graph.sinks().is_empty());
    }
}
