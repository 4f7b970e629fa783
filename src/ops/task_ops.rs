use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use crate::model::project::{INBOX_PROJECT_ID, Project};
use crate::model::task::{DEFAULT_TASK_TEXT, Priority, Task};

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(String),
}

static TRAILING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s+)#([^\s#]+)\s*$").unwrap());

/// Fields for a task about to be added
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub text: String,
    /// None means "whatever project is selected"
    pub project_id: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub reminder_time: Option<NaiveDateTime>,
    pub notes: String,
    pub tags: Vec<String>,
    pub priority: Priority,
}

impl NewTask {
    /// Quick-add form: trailing `#tag` words become tags.
    pub fn quick(input: &str) -> Self {
        let (text, tags) = parse_text_and_tags(input);
        NewTask {
            text,
            tags,
            ..Default::default()
        }
    }
}

/// Partial update applied by `edit`. `None` leaves a field alone; for the
/// optional dates, `Some(None)` clears them.
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub text: Option<String>,
    pub notes: Option<String>,
    pub project_id: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
    pub reminder_time: Option<Option<NaiveDateTime>>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.notes.is_none()
            && self.project_id.is_none()
            && self.due_date.is_none()
            && self.reminder_time.is_none()
            && self.priority.is_none()
            && self.tags.is_none()
    }

    /// The edited copy of `task`. The id never changes.
    pub fn apply(&self, task: &Task) -> Task {
        let mut out = task.clone();
        if let Some(text) = &self.text {
            out.text = text.clone();
        }
        if let Some(notes) = &self.notes {
            out.notes = notes.clone();
        }
        if let Some(project_id) = &self.project_id {
            out.project_id = project_id.clone();
        }
        if let Some(due) = self.due_date {
            out.due_date = due;
        }
        if let Some(reminder) = self.reminder_time {
            out.reminder_time = reminder;
        }
        if let Some(priority) = self.priority {
            out.priority = priority;
        }
        if let Some(tags) = &self.tags {
            out.tags = tags.clone();
        }
        out
    }
}

/// Split trailing `#tag` words off the end of quick-add text.
/// `"Buy milk #errand #home"` → `("Buy milk", ["errand", "home"])`
pub fn parse_text_and_tags(input: &str) -> (String, Vec<String>) {
    let mut remaining = input.trim_end();
    let mut tags = Vec::new();
    while let Some(caps) = TRAILING_TAG.captures(remaining) {
        let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        tags.push(tag.as_str().to_string());
        remaining = remaining[..whole.start()].trim_end();
    }
    tags.reverse();
    (remaining.trim().to_string(), tags)
}

/// Generate `<prefix>-<millis>`, bumping the number until it is unused.
pub fn next_id<'a>(
    prefix: &str,
    now: DateTime<Utc>,
    taken: impl IntoIterator<Item = &'a str>,
) -> String {
    let taken: HashSet<&str> = taken.into_iter().collect();
    let mut n = now.timestamp_millis();
    loop {
        let id = format!("{}-{}", prefix, n);
        if !taken.contains(id.as_str()) {
            return id;
        }
        n += 1;
    }
}

pub fn find_task<'a>(tasks: &'a [Task], id: &str) -> Option<&'a Task> {
    tasks.iter().find(|t| t.id == id)
}

/// Append a task built from `new` to the end of the document.
pub fn add_task(
    tasks: &[Task],
    new: NewTask,
    default_project: &str,
    created_at: DateTime<Utc>,
) -> (Vec<Task>, String) {
    let id = next_id("task", created_at, tasks.iter().map(|t| t.id.as_str()));
    let text = new.text.trim();
    let mut task = Task::new(
        id.clone(),
        if text.is_empty() { DEFAULT_TASK_TEXT } else { text },
        created_at,
    );
    task.project_id = new
        .project_id
        .unwrap_or_else(|| default_project.to_string());
    task.due_date = new.due_date;
    task.reminder_time = new.reminder_time;
    task.notes = new.notes;
    task.tags = new.tags;
    task.priority = new.priority;

    let mut out = tasks.to_vec();
    out.push(task);
    (out, id)
}

/// Replace the task with the same id, keeping its position.
pub fn update_task(tasks: &[Task], updated: Task) -> Result<Vec<Task>, TaskError> {
    let id = updated.id.clone();
    map_one(tasks, &id, move |_| updated)
}

pub fn toggle_done(tasks: &[Task], id: &str) -> Result<Vec<Task>, TaskError> {
    map_one(tasks, id, |t| Task {
        done: !t.done,
        ..t.clone()
    })
}

pub fn toggle_star(tasks: &[Task], id: &str) -> Result<Vec<Task>, TaskError> {
    map_one(tasks, id, |t| Task {
        starred: !t.starred,
        ..t.clone()
    })
}

pub fn delete_task(tasks: &[Task], id: &str) -> Result<Vec<Task>, TaskError> {
    if find_task(tasks, id).is_none() {
        return Err(TaskError::NotFound(id.to_string()));
    }
    Ok(tasks.iter().filter(|t| t.id != id).cloned().collect())
}

/// Mark every listed task done. Unknown ids are skipped.
pub fn complete_many(tasks: &[Task], ids: &[String]) -> Vec<Task> {
    tasks
        .iter()
        .map(|t| {
            if ids.contains(&t.id) {
                Task {
                    done: true,
                    ..t.clone()
                }
            } else {
                t.clone()
            }
        })
        .collect()
}

/// Drop every listed task. Unknown ids are skipped.
pub fn delete_many(tasks: &[Task], ids: &[String]) -> Vec<Task> {
    tasks.iter().filter(|t| !ids.contains(&t.id)).cloned().collect()
}

/// Move every task in project `from` to project `to`.
/// Move tasks whose project is not in `projects` to the inbox. Returns how
/// many moved.
pub fn rehome_orphans(tasks: &mut [Task], projects: &[Project]) -> usize {
    let mut moved = 0;
    for task in tasks.iter_mut() {
        if !projects.iter().any(|p| p.id == task.project_id) {
            task.project_id = INBOX_PROJECT_ID.to_string();
            moved += 1;
        }
    }
    moved
}

pub fn reassign_project(tasks: &[Task], from: &str, to: &str) -> Vec<Task> {
    tasks
        .iter()
        .map(|t| {
            if t.project_id == from {
                Task {
                    project_id: to.to_string(),
                    ..t.clone()
                }
            } else {
                t.clone()
            }
        })
        .collect()
}

fn map_one<F>(tasks: &[Task], id: &str, f: F) -> Result<Vec<Task>, TaskError>
where
    F: FnOnce(&Task) -> Task,
{
    let idx = tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
    let mut out = tasks.to_vec();
    out[idx] = f(&tasks[idx]);
    Ok(out)
}
