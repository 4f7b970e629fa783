use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexSet;

use crate::history::History;
use crate::io::kv_store::{KeyValueStore, StoreError, keys};
use crate::model::config::Config;
use crate::model::project::{INBOX_PROJECT_ID, Project, ProjectSelection, default_projects};
use crate::model::task::Task;
use crate::ops::pomodoro::{Durations, PomodoroTimer, TimerEvent, TimerMode};
use crate::ops::project_ops::{self, ProjectError};
use crate::ops::reminder::due_reminders;
use crate::ops::stats::{TaskStats, compute_stats, goal_percent};
use crate::ops::streak::{CompletionRecord, Streak, StreakEvent};
use crate::ops::task_ops::{self, NewTask, TaskEdit, TaskError};
use crate::ops::view::{ViewFilter, is_overdue, project_view};
use crate::util::clock::Clock;

/// Error type for dashboard operations
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error("unknown project: {0}")]
    UnknownProject(String),
    #[error("daily goal must be at least 1")]
    InvalidGoal,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of one timer tick that finished a countdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerTick {
    pub event: TimerEvent,
    /// Task auto-completed by a finished pomodoro
    pub completed_task: Option<String>,
}

/// One working session over a store.
///
/// Everything is loaded on `open` (falling back to defaults for anything
/// missing or malformed) and written back by `save` / `close`. The task
/// document is the only state under undo; projects, notes, the goal, the
/// timer and the view filter are not.
pub struct Dashboard<S: KeyValueStore> {
    store: S,
    clock: Box<dyn Clock>,
    config: Config,
    tasks: History<Vec<Task>>,
    projects: Vec<Project>,
    streak: Streak,
    timer: PomodoroTimer,
    notes: String,
    goal: u32,
    filter: ViewFilter,
    selected: IndexSet<String>,
}

impl<S: KeyValueStore> Dashboard<S> {
    pub fn open(store: S, clock: Box<dyn Clock>, config: Config) -> Self {
        let mut tasks: Vec<Task> = store.load_or_default(keys::TASKS, Vec::new());
        let projects = project_ops::normalize_projects(
            store.load_or_default(keys::PROJECTS, default_projects()),
        );
        let moved = task_ops::rehome_orphans(&mut tasks, &projects);
        if moved > 0 {
            log::warn!("{} tasks referenced missing projects, moved to inbox", moved);
        }
        let mut streak = Streak {
            count: store.load_or_default(keys::STREAK, 0),
            last_completion: store.load_or_default(keys::LAST_COMPLETION_DATE, None),
            history: store.load_or_default::<Vec<CompletionRecord>>(keys::HISTORY, Vec::new()),
        };
        streak.refresh(clock.today());

        let timer = PomodoroTimer::restore(
            Durations::from(&config.pomodoro),
            store.load_or_default(keys::POMODORO_MODE, TimerMode::Pomodoro),
            store.load_or_default(keys::POMODORO_RUNNING, false),
            store.load_or_default(keys::POMODORO_REMAINING, 0),
            store.load_or_default(keys::POMODORO_CYCLES, 0),
        );
        let notes = store.load_or_default(keys::QUICK_NOTES, String::new());
        let goal = store
            .load_or_default(keys::DAILY_GOAL, config.goal.default)
            .max(1);

        log::debug!(
            "dashboard opened: {} tasks, {} projects, streak {}",
            tasks.len(),
            projects.len(),
            streak.count
        );

        Dashboard {
            store,
            clock,
            config,
            tasks: History::new(tasks),
            projects,
            streak,
            timer,
            notes,
            goal,
            filter: ViewFilter::default(),
            selected: IndexSet::new(),
        }
    }

    /// Write every persisted key.
    pub fn save(&mut self) -> Result<(), StoreError> {
        self.store.save(keys::TASKS, self.tasks.present())?;
        self.store.save(keys::PROJECTS, &self.projects)?;
        self.store.save(keys::STREAK, &self.streak.count)?;
        self.store
            .save(keys::LAST_COMPLETION_DATE, &self.streak.last_completion)?;
        self.store.save(keys::HISTORY, &self.streak.history)?;
        self.store.save(keys::QUICK_NOTES, &self.notes)?;
        self.store.save(keys::DAILY_GOAL, &self.goal)?;
        self.store.save(keys::POMODORO_MODE, &self.timer.mode)?;
        self.store.save(keys::POMODORO_RUNNING, &self.timer.running)?;
        self.store
            .save(keys::POMODORO_REMAINING, &self.timer.remaining)?;
        self.store.save(keys::POMODORO_CYCLES, &self.timer.cycles)?;
        Ok(())
    }

    /// Save and hand the store back.
    pub fn close(mut self) -> Result<S, DashboardError> {
        self.save()?;
        log::debug!("dashboard closed");
        Ok(self.store)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_clock(&mut self, clock: Box<dyn Clock>) {
        self.clock = clock;
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn now_local(&self) -> NaiveDateTime {
        self.clock.now_local()
    }

    /// The task document in insertion order
    pub fn tasks(&self) -> &[Task] {
        self.tasks.present()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        task_ops::find_task(self.tasks.present(), id)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn streak(&self) -> &Streak {
        &self.streak
    }

    pub fn timer(&self) -> &PomodoroTimer {
        &self.timer
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn goal(&self) -> u32 {
        self.goal
    }

    pub fn filter(&self) -> &ViewFilter {
        &self.filter
    }

    /// Search, due-today and sort toggles. Project selection goes through
    /// `select_project` so it can be validated.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
    }

    pub fn set_due_today(&mut self, on: bool) {
        self.filter.due_today = on;
    }

    pub fn set_sort_by_due(&mut self, on: bool) {
        self.filter.sort_by_due = on;
    }

    pub fn select_project(&mut self, selection: ProjectSelection) -> Result<(), DashboardError> {
        if let ProjectSelection::Project(id) = &selection {
            self.require_project(id)?;
        }
        self.filter.project = selection;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Derived view
    // -----------------------------------------------------------------------

    /// Filtered, sorted task list for display
    pub fn view(&self) -> Vec<&Task> {
        project_view(self.tasks.present(), &self.filter, self.today())
    }

    pub fn is_overdue(&self, task: &Task) -> bool {
        is_overdue(task, self.today())
    }

    pub fn stats(&self) -> TaskStats {
        compute_stats(self.tasks.present(), &self.projects)
    }

    /// Completed tasks as a percentage of the daily goal
    pub fn goal_progress(&self) -> u32 {
        let completed = self.tasks.present().iter().filter(|t| t.done).count();
        goal_percent(completed, self.goal)
    }

    /// Open tasks whose reminder is this minute
    pub fn due_reminders(&self) -> Vec<&Task> {
        due_reminders(self.tasks.present(), self.clock.now_local())
    }

    // -----------------------------------------------------------------------
    // Task operations
    // -----------------------------------------------------------------------

    /// Add a task. Without an explicit project it goes to the selected one,
    /// or the inbox when every project is shown.
    pub fn add_task(&mut self, new: NewTask) -> Result<String, DashboardError> {
        let default_project = self.filter.project.target_project().to_string();
        let project = new.project_id.as_deref().unwrap_or(&default_project);
        self.require_project(project)?;
        let (next, id) =
            task_ops::add_task(self.tasks.present(), new, &default_project, self.clock.now_utc());
        self.commit(next);
        log::info!("added task {}", id);
        Ok(id)
    }

    /// Quick-add with trailing `#tags`
    pub fn quick_add(&mut self, input: &str) -> Result<String, DashboardError> {
        self.add_task(NewTask::quick(input))
    }

    pub fn edit_task(&mut self, id: &str, edit: &TaskEdit) -> Result<(), DashboardError> {
        let task = self
            .task(id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
        if let Some(project) = &edit.project_id {
            self.require_project(project)?;
        }
        let updated = edit.apply(task);
        self.update_task(updated)
    }

    /// Replace a task by id
    pub fn update_task(&mut self, task: Task) -> Result<(), DashboardError> {
        let next = task_ops::update_task(self.tasks.present(), task)?;
        self.commit(next);
        Ok(())
    }

    pub fn toggle_done(&mut self, id: &str) -> Result<(), DashboardError> {
        let next = task_ops::toggle_done(self.tasks.present(), id)?;
        self.commit(next);
        Ok(())
    }

    pub fn toggle_star(&mut self, id: &str) -> Result<(), DashboardError> {
        let next = task_ops::toggle_star(self.tasks.present(), id)?;
        self.commit(next);
        Ok(())
    }

    pub fn delete_task(&mut self, id: &str) -> Result<(), DashboardError> {
        let next = task_ops::delete_task(self.tasks.present(), id)?;
        self.selected.shift_remove(id);
        self.commit(next);
        log::info!("deleted task {}", id);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Bulk selection
    // -----------------------------------------------------------------------

    /// Flip a task's membership in the selection. Returns whether it is now
    /// selected.
    pub fn toggle_select(&mut self, id: &str) -> Result<bool, DashboardError> {
        if self.task(id).is_none() {
            return Err(TaskError::NotFound(id.to_string()).into());
        }
        if self.selected.shift_remove(id) {
            Ok(false)
        } else {
            self.selected.insert(id.to_string());
            Ok(true)
        }
    }

    /// Selected ids in the order they were picked
    pub fn selection(&self) -> Vec<&str> {
        self.selected.iter().map(String::as_str).collect()
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Mark every selected task done in one commit. Returns how many were
    /// selected; nothing is committed for an empty selection.
    pub fn bulk_complete(&mut self) -> usize {
        let ids = self.take_selection();
        if ids.is_empty() {
            return 0;
        }
        let next = task_ops::complete_many(self.tasks.present(), &ids);
        self.commit(next);
        ids.len()
    }

    /// Delete every selected task in one commit.
    pub fn bulk_delete(&mut self) -> usize {
        let ids = self.take_selection();
        if ids.is_empty() {
            return 0;
        }
        let next = task_ops::delete_many(self.tasks.present(), &ids);
        self.commit(next);
        ids.len()
    }

    fn take_selection(&mut self) -> Vec<String> {
        self.selected.drain(..).collect()
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    /// Create a project and select it
    pub fn add_project(&mut self, name: &str, color: Option<&str>) -> Result<String, DashboardError> {
        let (projects, id) =
            project_ops::add_project(&self.projects, name, color, self.clock.now_utc())?;
        self.projects = projects;
        self.filter.project = ProjectSelection::Project(id.clone());
        log::info!("added project {}", id);
        Ok(id)
    }

    /// Remove a project and move its tasks to the inbox. The inbox and
    /// unknown ids are ignored (returns false).
    pub fn delete_project(&mut self, id: &str) -> bool {
        let Some(projects) = project_ops::remove_project(&self.projects, id) else {
            return false;
        };
        self.projects = projects;
        let next = task_ops::reassign_project(self.tasks.present(), id, INBOX_PROJECT_ID);
        if self.tasks.commit_if_changed(next) {
            self.after_change();
        }
        if self.filter.project == ProjectSelection::Project(id.to_string()) {
            self.filter.project = ProjectSelection::All;
        }
        log::info!("deleted project {}", id);
        true
    }

    fn require_project(&self, id: &str) -> Result<(), DashboardError> {
        if project_ops::find_project(&self.projects, id).is_none() {
            return Err(DashboardError::UnknownProject(id.to_string()));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Step back one task change. Project deletions are not part of task
    /// history, so restored tasks whose project is gone land in the inbox.
    pub fn undo(&mut self) -> bool {
        let moved = self.tasks.undo();
        if moved {
            self.rehome_orphans();
            self.after_change();
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        let moved = self.tasks.redo();
        if moved {
            self.rehome_orphans();
            self.after_change();
        }
        moved
    }

    pub fn can_undo(&self) -> bool {
        self.tasks.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.tasks.can_redo()
    }

    fn rehome_orphans(&mut self) {
        let projects = &self.projects;
        self.tasks.amend(|tasks| {
            task_ops::rehome_orphans(tasks, projects);
        });
    }

    fn commit(&mut self, next: Vec<Task>) {
        self.tasks.commit(next);
        self.after_change();
    }

    fn after_change(&mut self) {
        let today = self.today();
        match self.streak.observe(self.tasks.present(), today) {
            StreakEvent::Increased(n) => log::info!("streak now {}", n),
            StreakEvent::Reset => log::info!("streak reset"),
            StreakEvent::Unchanged => {}
        }
    }

    // -----------------------------------------------------------------------
    // Notes and goal
    // -----------------------------------------------------------------------

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Add a line to the end of the notes
    pub fn append_notes(&mut self, line: &str) {
        if !self.notes.is_empty() && !self.notes.ends_with('\n') {
            self.notes.push('\n');
        }
        self.notes.push_str(line);
    }

    pub fn set_goal(&mut self, goal: u32) -> Result<(), DashboardError> {
        if goal == 0 {
            return Err(DashboardError::InvalidGoal);
        }
        self.goal = goal;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Pomodoro
    // -----------------------------------------------------------------------

    pub fn start_timer(&mut self) {
        self.timer.start();
    }

    pub fn pause_timer(&mut self) {
        self.timer.pause();
    }

    pub fn reset_timer(&mut self) {
        self.timer.reset();
    }

    pub fn set_timer_mode(&mut self, mode: TimerMode) {
        self.timer.set_mode(mode);
    }

    /// Advance the timer one second. A finished pomodoro completes the first
    /// open task in the current view.
    pub fn tick_timer(&mut self) -> Option<TimerTick> {
        let event = self.timer.tick()?;
        let completed_task = match event {
            TimerEvent::PomodoroComplete { .. } => self.on_pomodoro_complete(),
            TimerEvent::BreakFinished => None,
        };
        Some(TimerTick {
            event,
            completed_task,
        })
    }

    /// Mark the first open task of the view done. Returns its id.
    pub fn on_pomodoro_complete(&mut self) -> Option<String> {
        let id = self.view().into_iter().find(|t| !t.done)?.id.clone();
        let next = task_ops::toggle_done(self.tasks.present(), &id).ok()?;
        self.commit(next);
        log::info!("pomodoro completed task {}", id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::kv_store::MemoryStore;
    use crate::util::clock::FixedClock;
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn open_on(store: MemoryStore, d: u32) -> Dashboard<MemoryStore> {
        Dashboard::open(store, Box::new(FixedClock::on(day(d))), Config::default())
    }

    fn fresh() -> Dashboard<MemoryStore> {
        open_on(MemoryStore::new(), 1)
    }

    fn view_ids(dash: &Dashboard<MemoryStore>) -> Vec<String> {
        dash.view().iter().map(|t| t.id.clone()).collect()
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    #[test]
    fn empty_store_opens_with_defaults() {
        let dash = fresh();
        assert!(dash.tasks().is_empty());
        assert_eq!(dash.projects(), default_projects().as_slice());
        assert_eq!(dash.goal(), 5);
        assert_eq!(dash.timer().display(), "25:00");
        assert!(!dash.can_undo());
    }

    #[test]
    fn close_then_reopen_round_trips() {
        let mut dash = fresh();
        let id = dash.quick_add("Write report #work").unwrap();
        dash.toggle_star(&id).unwrap();
        dash.set_notes("call the bank");
        dash.set_goal(3).unwrap();
        dash.add_project("Home", Some("#10b981")).unwrap();
        dash.set_timer_mode(TimerMode::ShortBreak);
        let tasks = dash.tasks().to_vec();
        let projects = dash.projects().to_vec();

        let store = dash.close().unwrap();
        let dash = open_on(store, 1);
        assert_eq!(dash.tasks(), tasks.as_slice());
        assert_eq!(dash.projects(), projects.as_slice());
        assert_eq!(dash.notes(), "call the bank");
        assert_eq!(dash.goal(), 3);
        assert_eq!(dash.timer().mode, TimerMode::ShortBreak);
        assert_eq!(dash.timer().display(), "05:00");
        // Undo history does not survive a reopen
        assert!(!dash.can_undo());
    }

    #[test]
    fn malformed_keys_fall_back() {
        let mut store = MemoryStore::new();
        store.write_raw(keys::TASKS, "not json").unwrap();
        store.write_raw(keys::PROJECTS, "[{\"id\": 3}]").unwrap();
        store.write_raw(keys::DAILY_GOAL, "0").unwrap();
        store.write_raw(keys::POMODORO_REMAINING, "0").unwrap();
        let dash = open_on(store, 1);
        assert!(dash.tasks().is_empty());
        assert_eq!(dash.projects(), default_projects().as_slice());
        assert_eq!(dash.goal(), 1);
        assert_eq!(dash.timer().remaining, 25 * 60);
    }

    #[test]
    fn project_list_without_inbox_gets_one() {
        let mut store = MemoryStore::new();
        let work = Project {
            id: "proj-1".into(),
            name: "Work".into(),
            color: "#ef4444".into(),
        };
        store.save(keys::PROJECTS, &vec![work.clone()]).unwrap();
        let dash = open_on(store, 1);
        assert_eq!(dash.projects(), &[Project::inbox(), work][..]);
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    #[test]
    fn commit_undo_redo() {
        let mut dash = fresh();
        let a = dash.quick_add("A").unwrap();
        let doc_a = dash.tasks().to_vec();
        dash.quick_add("B").unwrap();
        let doc_b = dash.tasks().to_vec();

        assert!(dash.undo());
        assert_eq!(dash.tasks(), doc_a.as_slice());
        assert!(dash.can_redo());
        assert!(dash.redo());
        assert_eq!(dash.tasks(), doc_b.as_slice());

        assert!(dash.undo());
        dash.toggle_done(&a).unwrap();
        assert!(!dash.can_redo());
    }

    #[test]
    fn undo_on_empty_history_is_a_no_op() {
        let mut dash = fresh();
        assert!(!dash.undo());
        assert!(!dash.redo());
    }

    #[test]
    fn failed_operation_does_not_commit() {
        let mut dash = fresh();
        assert!(dash.toggle_done("missing").is_err());
        assert!(!dash.can_undo());
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    #[test]
    fn add_goes_to_selected_project() {
        let mut dash = fresh();
        let project = dash.add_project("Work", None).unwrap();
        let id = dash.quick_add("Plan sprint").unwrap();
        assert_eq!(dash.task(&id).unwrap().project_id, project);

        dash.select_project(ProjectSelection::All).unwrap();
        let id = dash.quick_add("Groceries").unwrap();
        assert_eq!(dash.task(&id).unwrap().project_id, INBOX_PROJECT_ID);
    }

    #[test]
    fn add_to_unknown_project_is_rejected() {
        let mut dash = fresh();
        let new = NewTask {
            text: "x".into(),
            project_id: Some("proj-nope".into()),
            ..Default::default()
        };
        assert!(matches!(
            dash.add_task(new),
            Err(DashboardError::UnknownProject(_))
        ));
        assert!(matches!(
            dash.select_project(ProjectSelection::Project("proj-nope".into())),
            Err(DashboardError::UnknownProject(_))
        ));
    }

    #[test]
    fn edit_changes_fields_but_not_id() {
        let mut dash = fresh();
        let id = dash.quick_add("Draft").unwrap();
        let edit = TaskEdit {
            text: Some("Final".into()),
            due_date: Some(Some(day(4))),
            ..Default::default()
        };
        dash.edit_task(&id, &edit).unwrap();
        let task = dash.task(&id).unwrap();
        assert_eq!(task.text, "Final");
        assert_eq!(task.due_date, Some(day(4)));
    }

    #[test]
    fn view_orders_done_last_and_starred_first() {
        let mut dash = fresh();
        let one = dash.quick_add("one").unwrap();
        let two = dash.quick_add("two").unwrap();
        dash.toggle_star(&two).unwrap();
        assert_eq!(view_ids(&dash), vec![two.clone(), one.clone()]);
        dash.toggle_done(&two).unwrap();
        assert_eq!(view_ids(&dash), vec![one, two]);
    }

    #[test]
    fn overdue_uses_clock_date() {
        let mut dash = open_on(MemoryStore::new(), 5);
        let id = dash
            .add_task(NewTask {
                text: "Report".into(),
                due_date: Some(day(4)),
                ..Default::default()
            })
            .unwrap();
        let task = dash.task(&id).unwrap().clone();
        assert!(dash.is_overdue(&task));
        dash.set_clock(Box::new(FixedClock::on(day(4))));
        assert!(!dash.is_overdue(&task));
    }

    // -----------------------------------------------------------------------
    // Bulk and projects
    // -----------------------------------------------------------------------

    #[test]
    fn bulk_complete_is_one_commit() {
        let mut dash = fresh();
        let a = dash.quick_add("a").unwrap();
        let b = dash.quick_add("b").unwrap();
        dash.quick_add("c").unwrap();
        let before = dash.tasks().to_vec();
        assert!(dash.toggle_select(&a).unwrap());
        assert!(dash.toggle_select(&b).unwrap());
        assert_eq!(dash.bulk_complete(), 2);
        assert!(dash.selection().is_empty());
        assert_eq!(dash.tasks().iter().filter(|t| t.done).count(), 2);
        dash.undo();
        assert_eq!(dash.tasks(), before.as_slice());
    }

    #[test]
    fn deleting_a_task_drops_it_from_selection() {
        let mut dash = fresh();
        let a = dash.quick_add("a").unwrap();
        dash.toggle_select(&a).unwrap();
        dash.delete_task(&a).unwrap();
        assert!(dash.selection().is_empty());
        assert_eq!(dash.bulk_delete(), 0);
    }

    #[test]
    fn toggle_select_twice_deselects() {
        let mut dash = fresh();
        let a = dash.quick_add("a").unwrap();
        assert!(dash.toggle_select(&a).unwrap());
        assert!(!dash.toggle_select(&a).unwrap());
        assert!(dash.toggle_select("missing").is_err());
    }

    #[test]
    fn deleting_project_reassigns_tasks_to_inbox() {
        let mut dash = fresh();
        let project = dash.add_project("Errands", None).unwrap();
        let id = dash.quick_add("Post office").unwrap();
        assert!(dash.delete_project(&project));
        assert_eq!(dash.task(&id).unwrap().project_id, INBOX_PROJECT_ID);
        assert_eq!(dash.filter().project, ProjectSelection::All);
        assert!(project_ops::find_project(dash.projects(), &project).is_none());

        // Undo can't bring back a deleted project, so the task stays homed
        assert!(dash.undo());
        assert_eq!(dash.task(&id).unwrap().project_id, INBOX_PROJECT_ID);
        assert!(dash.redo());
        assert_eq!(dash.task(&id).unwrap().project_id, INBOX_PROJECT_ID);
    }

    #[test]
    fn undo_past_project_deletion_keeps_every_task_homed() {
        let mut dash = fresh();
        let project = dash.add_project("Errands", None).unwrap();
        let a = dash.quick_add("Post office").unwrap();
        let b = dash.quick_add("Bank").unwrap();
        dash.delete_project(&project);
        assert!(dash.undo());
        assert!(dash.undo());
        assert!(dash.task(&b).is_none());
        assert_eq!(dash.task(&a).unwrap().project_id, INBOX_PROJECT_ID);
        while dash.redo() {}
        for task in dash.tasks() {
            assert!(project_ops::find_project(dash.projects(), &task.project_id).is_some());
        }
        assert!(dash.stats().by_project.keys().all(|id| id == INBOX_PROJECT_ID));
    }

    #[test]
    fn stale_project_ids_are_rehomed_on_open() {
        let mut store = MemoryStore::new();
        let mut task = Task::new("task-1", "Lost", chrono::Utc::now());
        task.project_id = "proj-gone".into();
        store.save(keys::TASKS, &vec![task]).unwrap();
        let dash = open_on(store, 1);
        assert_eq!(dash.task("task-1").unwrap().project_id, INBOX_PROJECT_ID);
    }

    #[test]
    fn inbox_and_unknown_projects_are_not_deleted() {
        let mut dash = fresh();
        assert!(!dash.delete_project(INBOX_PROJECT_ID));
        assert!(!dash.delete_project("proj-missing"));
        assert_eq!(dash.projects(), default_projects().as_slice());
    }

    // -----------------------------------------------------------------------
    // Streak, goal, reminders
    // -----------------------------------------------------------------------

    #[test]
    fn streak_counts_days_with_everything_done() {
        let mut dash = fresh();
        let a = dash.quick_add("a").unwrap();
        dash.toggle_done(&a).unwrap();
        assert_eq!(dash.streak().count, 1);

        dash.set_clock(Box::new(FixedClock::on(day(2))));
        let b = dash.quick_add("b").unwrap();
        dash.toggle_done(&b).unwrap();
        assert_eq!(dash.streak().count, 2);

        let store = dash.close().unwrap();
        let dash = open_on(store, 5);
        assert_eq!(dash.streak().count, 0);
        assert_eq!(dash.streak().history.len(), 2);
    }

    #[test]
    fn goal_progress_caps_at_100() {
        let mut dash = fresh();
        dash.set_goal(2).unwrap();
        assert!(dash.set_goal(0).is_err());
        for text in ["a", "b", "c"] {
            let id = dash.quick_add(text).unwrap();
            dash.toggle_done(&id).unwrap();
        }
        assert_eq!(dash.goal_progress(), 100);
    }

    #[test]
    fn reminders_follow_the_clock() {
        let mut dash = fresh();
        let at = day(1).and_hms_opt(12, 0, 0).unwrap();
        dash.add_task(NewTask {
            text: "Standup".into(),
            reminder_time: Some(at),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(dash.due_reminders().len(), 1);
        dash.set_clock(Box::new(FixedClock::new(at + chrono::Duration::minutes(1))));
        assert!(dash.due_reminders().is_empty());
    }

    #[test]
    fn notes_append_on_new_line() {
        let mut dash = fresh();
        dash.append_notes("first");
        dash.append_notes("second");
        assert_eq!(dash.notes(), "first\nsecond");
    }

    // -----------------------------------------------------------------------
    // Pomodoro
    // -----------------------------------------------------------------------

    #[test]
    fn finished_pomodoro_completes_first_open_task() {
        let mut config = Config::default();
        config.pomodoro.work_minutes = 1;
        let mut dash = Dashboard::open(
            MemoryStore::new(),
            Box::new(FixedClock::on(day(1))),
            config,
        );
        let first = dash.quick_add("first").unwrap();
        let second = dash.quick_add("second").unwrap();
        dash.toggle_star(&second).unwrap();

        dash.start_timer();
        let mut tick = None;
        for _ in 0..60 {
            tick = dash.tick_timer();
        }
        let tick = tick.unwrap();
        assert_eq!(tick.event, TimerEvent::PomodoroComplete { cycles: 1 });
        // Starred task leads the view
        assert_eq!(tick.completed_task, Some(second.clone()));
        assert!(dash.task(&second).unwrap().done);
        assert!(!dash.task(&first).unwrap().done);
        assert_eq!(dash.timer().mode, TimerMode::ShortBreak);
    }

    #[test]
    fn pomodoro_with_nothing_open_completes_nothing() {
        let mut dash = fresh();
        assert_eq!(dash.on_pomodoro_complete(), None);
        assert!(!dash.can_undo());
    }
}
