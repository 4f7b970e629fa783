use chrono::NaiveDate;
use serde::Serialize;

use crate::model::project::{INBOX_PROJECT_ID, Project};
use crate::model::task::{Priority, Task, due_date, reminder_time};
use crate::ops::pomodoro::PomodoroTimer;
use crate::ops::stats::TaskStats;
use crate::ops::streak::{Streak, StreakStatus};
use crate::ops::view::is_overdue;
use crate::util::unicode::{single_line, truncate_to_width};

/// Cells given to task text on a listing row
const TEXT_WIDTH: usize = 48;

const PROGRESS_BAR_WIDTH: usize = 20;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub text: String,
    pub done: bool,
    pub starred: bool,
    pub priority: Priority,
    pub project: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    pub overdue: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct ProjectJson {
    pub id: String,
    pub name: String,
    pub color: String,
    pub total: usize,
    pub completed: usize,
}

#[derive(Serialize)]
pub struct StatsJson {
    pub total: usize,
    pub completed: usize,
    pub goal: u32,
    pub goal_percent: u32,
    pub streak: u32,
    pub projects: Vec<ProjectJson>,
}

#[derive(Serialize)]
pub struct StreakJson {
    pub count: u32,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_completion_date: Option<String>,
    pub days_recorded: usize,
}

#[derive(Serialize)]
pub struct PomodoroJson {
    pub mode: &'static str,
    pub running: bool,
    pub remaining_seconds: u32,
    pub display: String,
    pub cycles: u32,
}

#[derive(Serialize)]
pub struct AddedJson {
    pub id: String,
}

#[derive(Serialize)]
pub struct NotesJson<'a> {
    pub notes: &'a str,
}

#[derive(Serialize)]
pub struct GoalJson {
    pub goal: u32,
    pub completed: usize,
    pub percent: u32,
}

#[derive(Serialize)]
pub struct TransferJson {
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<&'static str>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task, today: NaiveDate) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        text: task.text.clone(),
        done: task.done,
        starred: task.starred,
        priority: task.priority,
        project: task.project_id.clone(),
        tags: task.tags.clone(),
        due_date: task
            .due_date
            .map(|d| d.format(due_date::FORMAT).to_string()),
        reminder_time: task.reminder_time.as_ref().map(reminder_time::format),
        overdue: is_overdue(task, today),
        notes: task.notes.clone(),
        created_at: task
            .created_at
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    }
}

pub fn stats_to_json(
    stats: &TaskStats,
    projects: &[Project],
    goal: u32,
    goal_percent: u32,
    streak: u32,
) -> StatsJson {
    StatsJson {
        total: stats.total,
        completed: stats.completed,
        goal,
        goal_percent,
        streak,
        projects: stats
            .by_project
            .iter()
            .map(|(id, s)| {
                let project = projects.iter().find(|p| &p.id == id);
                ProjectJson {
                    id: id.clone(),
                    name: project.map(|p| p.name.clone()).unwrap_or_default(),
                    color: project.map(|p| p.color.clone()).unwrap_or_default(),
                    total: s.total,
                    completed: s.completed,
                }
            })
            .collect(),
    }
}

pub fn streak_to_json(streak: &Streak, today: NaiveDate) -> StreakJson {
    StreakJson {
        count: streak.count,
        status: streak_status_str(streak.status(today)),
        last_completion_date: streak
            .last_completion
            .map(|d| d.format(due_date::FORMAT).to_string()),
        days_recorded: streak.history.len(),
    }
}

pub fn pomodoro_to_json(timer: &PomodoroTimer) -> PomodoroJson {
    PomodoroJson {
        mode: timer.mode.as_str(),
        running: timer.running,
        remaining_seconds: timer.remaining,
        display: timer.display(),
        cycles: timer.cycles,
    }
}

fn streak_status_str(status: StreakStatus) -> &'static str {
    match status {
        StreakStatus::NoHistory => "none",
        StreakStatus::Active => "active",
        StreakStatus::Broken => "broken",
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// One-line task summary:
/// `[x] ★ task-1  Write report #work due 2024-05-03 !high @Work`
pub fn format_task_line(task: &Task, today: NaiveDate, projects: &[Project]) -> String {
    let check = if task.done { 'x' } else { ' ' };
    let star = if task.starred { '★' } else { ' ' };
    let mut line = format!(
        "[{}] {} {}  {}",
        check,
        star,
        task.id,
        truncate_to_width(&single_line(&task.text), TEXT_WIDTH)
    );
    for tag in &task.tags {
        line.push_str(&format!(" #{}", tag));
    }
    if let Some(due) = task.due_date {
        line.push_str(&format!(" due {}", due.format(due_date::FORMAT)));
        if is_overdue(task, today) {
            line.push_str(" (overdue)");
        }
    }
    if let Some(reminder) = &task.reminder_time {
        line.push_str(&format!(" ⏰ {}", reminder.format("%Y-%m-%d %H:%M")));
    }
    if task.priority != Priority::Normal {
        line.push_str(&format!(" !{}", task.priority.as_str()));
    }
    if task.project_id != INBOX_PROJECT_ID {
        let name = projects
            .iter()
            .find(|p| p.id == task.project_id)
            .map(|p| p.name.as_str())
            .unwrap_or(task.project_id.as_str());
        line.push_str(&format!(" @{}", name));
    }
    line
}

/// The task list. `document_empty` picks the empty-state message.
pub fn format_task_list(
    view: &[&Task],
    today: NaiveDate,
    projects: &[Project],
    compact: bool,
    document_empty: bool,
) -> Vec<String> {
    if view.is_empty() {
        let msg = if document_empty {
            "Add a task to get started!"
        } else {
            "No tasks match your filter."
        };
        return vec![msg.to_string()];
    }
    let mut lines = Vec::new();
    for task in view {
        lines.push(format_task_line(task, today, projects));
        if !compact && !task.notes.is_empty() {
            lines.push(format!(
                "        {}",
                truncate_to_width(&single_line(&task.notes), TEXT_WIDTH)
            ));
        }
    }
    lines
}

pub fn format_project_line(project: &Project, total: usize, completed: usize) -> String {
    format!(
        "{} {} ({}) {}/{}",
        project.color, project.name, project.id, completed, total
    )
}

/// `[#####---------------] 25%`
pub fn format_progress_bar(percent: u32) -> String {
    let filled = (percent.min(100) as usize * PROGRESS_BAR_WIDTH) / 100;
    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled),
        percent
    )
}

pub fn format_stats(
    stats: &TaskStats,
    projects: &[Project],
    goal: u32,
    goal_percent: u32,
    streak: u32,
) -> Vec<String> {
    let mut lines = vec![
        format!("tasks: {} total, {} done", stats.total, stats.completed),
        format!("goal:  {} {}", goal, format_progress_bar(goal_percent)),
        format!("streak: {} {}", streak, if streak == 1 { "day" } else { "days" }),
    ];
    if !stats.by_project.is_empty() {
        lines.push(String::new());
        for (id, s) in &stats.by_project {
            let name = projects
                .iter()
                .find(|p| &p.id == id)
                .map(|p| p.name.as_str())
                .unwrap_or(id.as_str());
            lines.push(format!("  {:<16} {}/{}", name, s.completed, s.total));
        }
    }
    lines
}

pub fn format_pomodoro(timer: &PomodoroTimer) -> String {
    format!(
        "{} {} ({}) cycles: {}",
        timer.mode.as_str(),
        timer.display(),
        if timer.running { "running" } else { "paused" },
        timer.cycles
    )
}

pub fn format_streak(streak: &Streak, today: NaiveDate) -> String {
    match streak.status(today) {
        StreakStatus::NoHistory => "no streak yet: finish every task on your list to start one"
            .to_string(),
        StreakStatus::Broken => format!(
            "streak: 0 days (last completion {})",
            streak
                .last_completion
                .map(|d| d.format(due_date::FORMAT).to_string())
                .unwrap_or_default()
        ),
        StreakStatus::Active => format!(
            "streak: {} {}",
            streak.count,
            if streak.count == 1 { "day" } else { "days" }
        ),
    }
}
