use serde::{Deserialize, Serialize};

/// The reserved project every task falls back to
pub const INBOX_PROJECT_ID: &str = "inbox";
pub const INBOX_COLOR: &str = "#6b7280";
pub const DEFAULT_PROJECT_COLOR: &str = "#0072ff";

/// A named, colored group of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    DEFAULT_PROJECT_COLOR.to_string()
}

impl Project {
    pub fn inbox() -> Self {
        Project {
            id: INBOX_PROJECT_ID.to_string(),
            name: "Inbox".to_string(),
            color: INBOX_COLOR.to_string(),
        }
    }

    /// The inbox can't be deleted
    pub fn is_reserved(&self) -> bool {
        self.id == INBOX_PROJECT_ID
    }
}

/// Project list for a fresh data directory
pub fn default_projects() -> Vec<Project> {
    vec![Project::inbox()]
}

/// Which projects the task view shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProjectSelection {
    #[default]
    All,
    Project(String),
}

impl ProjectSelection {
    /// `"all"` selects every project, anything else is a project id
    pub fn parse(s: &str) -> ProjectSelection {
        match s.trim() {
            "" | "all" => ProjectSelection::All,
            id => ProjectSelection::Project(id.to_string()),
        }
    }

    pub fn includes(&self, project_id: &str) -> bool {
        match self {
            ProjectSelection::All => true,
            ProjectSelection::Project(id) => id == project_id,
        }
    }

    /// Project that new tasks land in under this selection
    pub fn target_project(&self) -> &str {
        match self {
            ProjectSelection::All => INBOX_PROJECT_ID,
            ProjectSelection::Project(id) => id,
        }
    }
}
