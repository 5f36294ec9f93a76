//! End-to-end checks on a 25-task PERT network.

use pert_rust::{
    compute_schedule, ScheduleConfig, ScheduleResult, ScheduleSession, ScheduleState, Task,
};

fn make_task(name: &str, duration: f64, preds: &str) -> Task {
    Task::new(name.to_string(), duration, preds.to_string())
}

fn reference_tasks() -> Vec<Task> {
    vec![
        make_task("D", 0.0, ""),
        make_task("a", 7.0, "D"),
        make_task("b", 7.0, "a"),
        make_task("c", 15.0, "b"),
        make_task("d", 30.0, "c"),
        make_task("h", 60.0, "d"),
        make_task("i", 20.0, "h"),
        make_task("j", 30.0, "i"),
        make_task("e", 45.0, "d"),
        make_task("f", 15.0, "e"),
        make_task("k", 30.0, "f"),
        make_task("l", 15.0, "k"),
        make_task("g", 45.0, "d"),
        make_task("m", 30.0, "g,j,l"),
        make_task("p", 15.0, "m"),
        make_task("n", 15.0, "m"),
        make_task("o", 30.0, "n"),
        make_task("q", 15.0, "o"),
        make_task("r", 15.0, "q"),
        make_task("s", 30.0, "q"),
        make_task("w", 7.0, "r,s"),
        make_task("t", 7.0, "p,r"),
        make_task("u", 4.0, "t"),
        make_task("v", 2.0, "s,t"),
        make_task("F", 0.0, "u,v,w"),
    ]
}

fn times(result: &ScheduleResult, name: &str) -> (f64, f64, f64, f64, f64) {
    let task = result.find(name).unwrap();
    (
        task.earliest_start.unwrap(),
        task.earliest_finish.unwrap(),
        task.latest_start.unwrap(),
        task.latest_finish.unwrap(),
        task.slack.unwrap(),
    )
}

#[test]
fn test_reference_project_times() {
    let result = compute_schedule(&reference_tasks(), &ScheduleConfig::default());

    assert!(!result.is_cyclic);
    assert_eq!(result.project_finish, Some(296.0));
    assert_eq!(
        result.sorted_tasks,
        vec![
            "D", "a", "b", "c", "d", "h", "e", "g", "i", "f", "j", "k", "l", "m", "p", "n", "o",
            "q", "r", "s", "t", "w", "u", "v", "F"
        ]
    );

    assert_eq!(times(&result, "d"), (29.0, 59.0, 29.0, 59.0, 0.0));
    assert_eq!(times(&result, "e"), (59.0, 104.0, 64.0, 109.0, 5.0));
    assert_eq!(times(&result, "g"), (59.0, 104.0, 124.0, 169.0, 65.0));
    assert_eq!(times(&result, "m"), (169.0, 199.0, 169.0, 199.0, 0.0));
    assert_eq!(times(&result, "p"), (199.0, 214.0, 270.0, 285.0, 71.0));
    assert_eq!(times(&result, "t"), (274.0, 281.0, 285.0, 292.0, 11.0));
    assert_eq!(times(&result, "v"), (289.0, 291.0, 294.0, 296.0, 5.0));
    assert_eq!(times(&result, "F"), (296.0, 296.0, 296.0, 296.0, 0.0));
}

#[test]
fn test_reference_project_critical_path() {
    let result = compute_schedule(&reference_tasks(), &ScheduleConfig::default());

    assert_eq!(
        result.critical_path_label.as_deref(),
        Some("D - a - b - c - d - h - i - j - m - n - o - q - s - w - F")
    );
    assert_eq!(result.critical_chains.len(), 1);
    assert_eq!(result.critical_chains[0], result.critical_path);

    for task in &result.tasks {
        let slack = task.slack.unwrap();
        assert!(slack >= 0.0, "{} has negative float", task.name);
        assert_eq!(task.is_critical, slack.abs() < 0.001, "{}", task.name);
    }
}

#[test]
fn test_reference_project_edge_invariants() {
    let result = compute_schedule(&reference_tasks(), &ScheduleConfig::default());

    for task in &result.tasks {
        let es = task.earliest_start.unwrap();
        let ef = task.earliest_finish.unwrap();
        let lf = task.latest_finish.unwrap();
        assert_eq!(ef, es + task.duration);
        assert_eq!(task.latest_start.unwrap(), lf - task.duration);

        let max_pred_ef = task
            .predecessors
            .iter()
            .map(|p| result.find(p).unwrap().earliest_finish.unwrap())
            .fold(0.0, f64::max);
        assert_eq!(es, max_pred_ef, "{}", task.name);

        for succ in &task.successors {
            let succ = result.find(succ).unwrap();
            assert!(ef <= succ.earliest_start.unwrap());
            assert!(lf <= succ.latest_start.unwrap());
        }
    }

    let d = result.find("d").unwrap();
    assert_eq!(d.successors, vec!["h", "e", "g"]);
}

#[test]
fn test_session_matches_single_call() {
    let mut session = ScheduleSession::with_config(reference_tasks(), ScheduleConfig::default());
    session.compute_earliest().unwrap();
    session.compute_latest().unwrap();

    assert_eq!(session.state(), ScheduleState::LatestComputed);
    assert_eq!(
        session.result(),
        compute_schedule(&reference_tasks(), &ScheduleConfig::default())
    );
}

#[test]
fn test_dangling_reference_changes_nothing() {
    let mut tasks = reference_tasks();
    tasks[13] = make_task("m", 30.0, "g, j, l, nowhere");

    let with_ghost = compute_schedule(&tasks, &ScheduleConfig::default());
    let clean = compute_schedule(&reference_tasks(), &ScheduleConfig::default());

    assert_eq!(with_ghost.tasks, clean.tasks);
    assert_eq!(
        with_ghost.unresolved_references,
        vec![("m".to_string(), "nowhere".to_string())]
    );
}

#[test]
fn test_introducing_cycle_disables_times() {
    let mut tasks = reference_tasks();
    // D now waits for F, closing a loop through the whole network
    tasks[0] = make_task("D", 0.0, "F");

    let result = compute_schedule(&tasks, &ScheduleConfig::default());
    assert!(result.is_cyclic);
    assert_eq!(result.cyclic_tasks.len(), 25);
    assert!(result.sorted_tasks.is_empty());
    assert!(result.tasks.iter().all(|t| t.earliest_start.is_none()));
}
