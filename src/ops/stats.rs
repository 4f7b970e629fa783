use indexmap::IndexMap;

use crate::model::project::Project;
use crate::model::task::Task;

/// Task totals for the whole document and per project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    /// Keyed by project id, in project-list order. Ids missing from the
    /// list are appended after it.
    pub by_project: IndexMap<String, ProjectStats>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectStats {
    pub total: usize,
    pub completed: usize,
}

pub fn compute_stats(tasks: &[Task], projects: &[Project]) -> TaskStats {
    let mut by_project: IndexMap<String, ProjectStats> = projects
        .iter()
        .map(|p| (p.id.clone(), ProjectStats::default()))
        .collect();
    let mut stats = TaskStats::default();
    for task in tasks {
        stats.total += 1;
        let entry = by_project.entry(task.project_id.clone()).or_default();
        entry.total += 1;
        if task.done {
            stats.completed += 1;
            entry.completed += 1;
        }
    }
    stats.by_project = by_project;
    stats
}

/// Progress toward the daily goal, 0–100. A goal below one counts as one.
pub fn goal_percent(completed: usize, goal: u32) -> u32 {
    let goal = goal.max(1) as f64;
    let pct = (completed as f64 / goal * 100.0).min(100.0);
    pct.round() as u32
}
