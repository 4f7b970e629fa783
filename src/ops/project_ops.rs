use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::model::project::{DEFAULT_PROJECT_COLOR, INBOX_PROJECT_ID, Project};
use crate::ops::task_ops::next_id;

/// Error type for project operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("project name cannot be empty")]
    EmptyName,
    #[error("invalid color '{0}': expected #rgb or #rrggbb")]
    InvalidColor(String),
    #[error("project not found: {0}")]
    NotFound(String),
}

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap());

pub fn find_project<'a>(projects: &'a [Project], id: &str) -> Option<&'a Project> {
    projects.iter().find(|p| p.id == id)
}

/// Append a new project. Returns the new list and the generated id.
pub fn add_project(
    projects: &[Project],
    name: &str,
    color: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(Vec<Project>, String), ProjectError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ProjectError::EmptyName);
    }
    let color = match color.map(str::trim) {
        None | Some("") => DEFAULT_PROJECT_COLOR.to_string(),
        Some(c) if HEX_COLOR.is_match(c) => c.to_string(),
        Some(c) => return Err(ProjectError::InvalidColor(c.to_string())),
    };
    let id = next_id("proj", now, projects.iter().map(|p| p.id.as_str()));
    let mut out = projects.to_vec();
    out.push(Project {
        id: id.clone(),
        name: name.to_string(),
        color,
    });
    Ok((out, id))
}

/// Remove a project from the list. Returns `None` for the reserved inbox or
/// an unknown id; both are silently ignored by callers.
pub fn remove_project(projects: &[Project], id: &str) -> Option<Vec<Project>> {
    if id == INBOX_PROJECT_ID || find_project(projects, id).is_none() {
        return None;
    }
    Some(projects.iter().filter(|p| p.id != id).cloned().collect())
}

/// Guarantee the reserved inbox exists (first) and ids are unique.
pub fn normalize_projects(projects: Vec<Project>) -> Vec<Project> {
    let mut out: Vec<Project> = Vec::with_capacity(projects.len() + 1);
    if !projects.iter().any(|p| p.is_reserved()) {
        out.push(Project::inbox());
    }
    for project in projects {
        if out.iter().any(|p| p.id == project.id) {
            continue;
        }
        out.push(project);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::project::default_projects;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn add_generates_id_and_default_color() {
        let (out, id) = add_project(&default_projects(), " Work ", None, now()).unwrap();
        assert_eq!(out.len(), 2);
        let p = find_project(&out, &id).unwrap();
        assert_eq!(p.name, "Work");
        assert_eq!(p.color, DEFAULT_PROJECT_COLOR);
        assert!(id.starts_with("proj-"));
    }

    #[test]
    fn add_validates_name_and_color() {
        assert!(matches!(
            add_project(&[], "  ", None, now()),
            Err(ProjectError::EmptyName)
        ));
        assert!(matches!(
            add_project(&[], "Work", Some("blue"), now()),
            Err(ProjectError::InvalidColor(_))
        ));
        assert!(add_project(&[], "Work", Some("#10b981"), now()).is_ok());
    }

    #[test]
    fn inbox_cannot_be_removed() {
        assert!(remove_project(&default_projects(), INBOX_PROJECT_ID).is_none());
    }

    #[test]
    fn remove_unknown_is_none() {
        assert!(remove_project(&default_projects(), "proj-x").is_none());
    }

    #[test]
    fn remove_existing() {
        let (projects, id) = add_project(&default_projects(), "Work", None, now()).unwrap();
        let out = remove_project(&projects, &id).unwrap();
        assert_eq!(out, default_projects());
    }

    #[test]
    fn normalize_adds_inbox_and_dedupes() {
        let work = Project {
            id: "proj-1".into(),
            name: "Work".into(),
            color: "#fff".into(),
        };
        let out = normalize_projects(vec![work.clone(), work.clone()]);
        assert_eq!(out.len(), 2);
        assert!(out[0].is_reserved());
        assert_eq!(out[1], work);
    }
}
