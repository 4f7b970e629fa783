use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::io::kv_store::{KeyValueStore, StoreError, atomic_write, keys};
use crate::model::config::{BackupConfig, GoalConfig};
use crate::model::export::{ExportPayload, PomodoroExport};
use crate::model::project::{Project, default_projects};
use crate::model::task::Task;

/// Error type for `import`
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is not a valid export file: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Backup file name for a given day
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("focusspace_backup_{}.json", date.format("%Y-%m-%d"))
}

/// Gather everything exportable from the store.
pub fn build_payload<S: KeyValueStore>(store: &S) -> ExportPayload {
    ExportPayload {
        tasks: Some(store.load_or_default::<Vec<Task>>(keys::TASKS, Vec::new())),
        projects: Some(store.load_or_default::<Vec<Project>>(keys::PROJECTS, default_projects())),
        streak: Some(store.load_or_default(keys::STREAK, 0u32)),
        last_completion_date: store
            .load_or_default::<Option<NaiveDate>>(keys::LAST_COMPLETION_DATE, None),
        pomodoro: Some(PomodoroExport {
            cycles: Some(store.load_or_default(keys::POMODORO_CYCLES, 0u32)),
        }),
        notes: Some(store.load_or_default(keys::QUICK_NOTES, String::new())),
        goal: Some(store.load_or_default(keys::DAILY_GOAL, GoalConfig::default().default)),
    }
}

/// Write the store's contents to `path` as pretty JSON.
pub fn export_to<S: KeyValueStore>(store: &S, path: &Path) -> Result<ExportPayload, StoreError> {
    let payload = build_payload(store);
    let json = serde_json::to_string_pretty(&payload).map_err(|source| StoreError::Serialize {
        key: "export".to_string(),
        source,
    })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    atomic_write(path, json.as_bytes()).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("exported to {}", path.display());
    Ok(payload)
}

/// Read an export file and overwrite the keys it carries. The file is fully
/// parsed before anything is written, so a bad file changes nothing.
///
/// Returns the store keys that were overwritten.
pub fn import_from<S: KeyValueStore>(
    store: &mut S,
    path: &Path,
) -> Result<Vec<&'static str>, ImportError> {
    let text = fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let payload: ExportPayload =
        serde_json::from_str(&text).map_err(|source| ImportError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    let written = apply_payload(store, &payload)?;
    log::info!("imported {} ({} keys)", path.display(), written.len());
    Ok(written)
}

/// Overwrite stored keys from a payload. Empty notes and a zero goal are
/// treated as absent.
pub fn apply_payload<S: KeyValueStore>(
    store: &mut S,
    payload: &ExportPayload,
) -> Result<Vec<&'static str>, StoreError> {
    let mut written = Vec::new();
    if let Some(tasks) = &payload.tasks {
        store.save(keys::TASKS, tasks)?;
        written.push(keys::TASKS);
    }
    if let Some(projects) = &payload.projects {
        store.save(keys::PROJECTS, projects)?;
        written.push(keys::PROJECTS);
    }
    if let Some(streak) = payload.streak {
        store.save(keys::STREAK, &streak)?;
        written.push(keys::STREAK);
    }
    if let Some(date) = payload.last_completion_date {
        store.save(keys::LAST_COMPLETION_DATE, &date)?;
        written.push(keys::LAST_COMPLETION_DATE);
    }
    if let Some(cycles) = payload.pomodoro.as_ref().and_then(|p| p.cycles) {
        store.save(keys::POMODORO_CYCLES, &cycles)?;
        written.push(keys::POMODORO_CYCLES);
    }
    if let Some(notes) = payload.notes.as_deref().filter(|n| !n.is_empty()) {
        store.save(keys::QUICK_NOTES, notes)?;
        written.push(keys::QUICK_NOTES);
    }
    if let Some(goal) = payload.goal.filter(|g| *g != 0) {
        store.save(keys::DAILY_GOAL, &goal)?;
        written.push(keys::DAILY_GOAL);
    }
    Ok(written)
}

/// Export to `<backup_dir>/focusspace_backup_<today>.json` when the last
/// backup is missing or older than the configured interval. Returns the
/// path written, if any.
pub fn backup_if_due<S: KeyValueStore>(
    store: &mut S,
    backup_dir: &Path,
    today: NaiveDate,
    config: &BackupConfig,
) -> Result<Option<PathBuf>, StoreError> {
    if !config.auto_backup {
        return Ok(None);
    }
    let last: Option<NaiveDate> = store.load_or_default(keys::LAST_BACKUP_DATE, None);
    let due = match last {
        None => true,
        Some(last) => (today - last).num_days() > i64::from(config.interval_days),
    };
    if !due {
        return Ok(None);
    }
    let path = backup_dir.join(backup_file_name(today));
    export_to(store, &path)?;
    store.save(keys::LAST_BACKUP_DATE, &today)?;
    log::info!("automatic backup written to {}", path.display());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::kv_store::MemoryStore;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn seeded() -> MemoryStore {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let mut task = Task::new("task-1", "Write report", created);
        task.due_date = Some(day(3));
        task.tags = vec!["work".into()];
        let mut store = MemoryStore::new();
        store.save(keys::TASKS, &vec![task]).unwrap();
        store.save(keys::STREAK, &4u32).unwrap();
        store.save(keys::LAST_COMPLETION_DATE, &day(2)).unwrap();
        store.save(keys::POMODORO_CYCLES, &6u32).unwrap();
        store.save(keys::QUICK_NOTES, "remember").unwrap();
        store.save(keys::DAILY_GOAL, &3u32).unwrap();
        store
    }

    #[test]
    fn export_then_import_into_empty_store() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out").join("export.json");
        let source = seeded();
        let exported = export_to(&source, &path).unwrap();

        let mut target = MemoryStore::new();
        import_from(&mut target, &path).unwrap();
        assert_eq!(build_payload(&target), exported);
    }

    #[test]
    fn export_file_uses_persisted_field_names() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("export.json");
        export_to(&seeded(), &path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["tasks"][0]["dueDate"], "2024-05-03");
        assert_eq!(value["lastCompletionDate"], "2024-05-02");
        assert_eq!(value["pomodoro"]["cycles"], 6);
        assert_eq!(value["notes"], "remember");
    }

    #[test]
    fn malformed_import_leaves_store_untouched() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        fs::write(&path, "{\"tasks\": [").unwrap();
        let mut store = seeded();
        let before = store.clone();
        assert!(matches!(
            import_from(&mut store, &path),
            Err(ImportError::Parse { .. })
        ));
        assert_eq!(store, before);
    }

    #[test]
    fn missing_import_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let mut store = MemoryStore::new();
        assert!(matches!(
            import_from(&mut store, &tmp.path().join("nope.json")),
            Err(ImportError::Read { .. })
        ));
    }

    #[test]
    fn partial_import_only_touches_present_keys() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("partial.json");
        fs::write(
            &path,
            r#"{"streak": 9, "notes": "", "goal": 0, "lastCompletionDate": null}"#,
        )
        .unwrap();
        let mut store = seeded();
        let written = import_from(&mut store, &path).unwrap();
        assert_eq!(written, vec![keys::STREAK]);
        assert_eq!(store.load_or_default(keys::STREAK, 0u32), 9);
        assert_eq!(
            store.load_or_default(keys::QUICK_NOTES, String::new()),
            "remember"
        );
        assert_eq!(store.load_or_default(keys::DAILY_GOAL, 0u32), 3);
        assert_eq!(
            store.load_or_default::<Option<NaiveDate>>(keys::LAST_COMPLETION_DATE, None),
            Some(day(2))
        );
    }

    #[test]
    fn backup_runs_when_never_backed_up() {
        let tmp = TempDir::new().unwrap();
        let mut store = seeded();
        let path = backup_if_due(&mut store, tmp.path(), day(10), &BackupConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(path, tmp.path().join("focusspace_backup_2024-05-10.json"));
        assert!(path.exists());
        assert_eq!(
            store.load_or_default::<Option<NaiveDate>>(keys::LAST_BACKUP_DATE, None),
            Some(day(10))
        );
    }

    #[test]
    fn backup_waits_for_interval() {
        let tmp = TempDir::new().unwrap();
        let mut store = seeded();
        store.save(keys::LAST_BACKUP_DATE, &day(1)).unwrap();
        let config = BackupConfig::default();
        // Exactly seven days is not yet "more than seven"
        assert_eq!(backup_if_due(&mut store, tmp.path(), day(8), &config).unwrap(), None);
        assert!(backup_if_due(&mut store, tmp.path(), day(9), &config).unwrap().is_some());
    }

    #[test]
    fn backup_disabled_by_config() {
        let tmp = TempDir::new().unwrap();
        let mut store = MemoryStore::new();
        let config = BackupConfig {
            auto_backup: false,
            ..Default::default()
        };
        assert_eq!(backup_if_due(&mut store, tmp.path(), day(9), &config).unwrap(), None);
        assert!(store.is_empty());
    }
}
