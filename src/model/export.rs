use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::project::Project;
use super::task::{Task, due_date};

/// Portable backup of everything the dashboard persists.
///
/// Every field is optional on import so that partial or older files still
/// load; export always fills them all in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    #[serde(default)]
    pub tasks: Option<Vec<Task>>,
    #[serde(default)]
    pub projects: Option<Vec<Project>>,
    #[serde(default)]
    pub streak: Option<u32>,
    #[serde(default, with = "due_date")]
    pub last_completion_date: Option<NaiveDate>,
    #[serde(default)]
    pub pomodoro: Option<PomodoroExport>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub goal: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroExport {
    #[serde(default)]
    pub cycles: Option<u32>,
}
