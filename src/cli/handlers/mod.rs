mod init;
mod shell;
pub use init::cmd_init;
pub use shell::cmd_shell;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chrono::NaiveDate;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::dashboard::Dashboard;
use crate::io::config_io;
use crate::io::export;
use crate::io::kv_store::{FileStore, KeyValueStore};
use crate::model::config::Config;
use crate::model::project::ProjectSelection;
use crate::model::task::{Priority, Task, due_date, reminder_time};
use crate::ops::pomodoro::{TimerEvent, TimerMode};
use crate::ops::reminder::due_reminders;
use crate::ops::task_ops::{NewTask, TaskEdit, parse_text_and_tags};
use crate::ops::view::project_view;
use crate::util::clock::{Clock, SystemClock};

/// Resolved global options
pub struct Context {
    pub data_dir: PathBuf,
    pub json: bool,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Self {
        Context {
            data_dir: config_io::resolve_data_dir(cli.data_dir.as_deref().map(Path::new)),
            json: cli.json,
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_cli(&cli);
    let json = ctx.json;

    let command = cli.command.unwrap_or(Commands::List(ListArgs::default()));
    match command {
        Commands::Init(args) => cmd_init(&ctx, args),
        // These work on the store directly; an open dashboard would write
        // its own copy back over an import.
        Commands::Export(args) => cmd_export(&ctx, args),
        Commands::Import(args) => cmd_import(&ctx, args),
        Commands::Shell(args) => cmd_shell(&ctx, args),

        // Read commands
        Commands::List(args) => with_dashboard(&ctx, |d| cmd_list(d, args, json)),
        Commands::Stats => with_dashboard(&ctx, |d| cmd_stats(d, json)),
        Commands::Streak => with_dashboard(&ctx, |d| cmd_streak(d, json)),
        Commands::Remind(args) => with_dashboard(&ctx, |d| cmd_remind(d, args, json)),

        // Write commands
        Commands::Add(args) => with_dashboard(&ctx, |d| cmd_add(d, args, json)),
        Commands::Edit(args) => with_dashboard(&ctx, |d| cmd_edit(d, args)),
        Commands::Done(args) => with_dashboard(&ctx, |d| cmd_done(d, args)),
        Commands::Star(args) => with_dashboard(&ctx, |d| cmd_star(d, args)),
        Commands::Rm(args) => with_dashboard(&ctx, |d| cmd_rm(d, args)),
        Commands::Project(args) => with_dashboard(&ctx, |d| cmd_project(d, args, json)),
        Commands::Note(args) => with_dashboard(&ctx, |d| cmd_note(d, args, json)),
        Commands::Goal(args) => with_dashboard(&ctx, |d| cmd_goal(d, args, json)),
        Commands::Pomodoro(args) => with_dashboard(&ctx, |d| cmd_pomodoro(d, args, json)),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Open the file store for the data directory, run the weekly backup if it
/// is due, and load a dashboard over it.
pub fn open_dashboard(ctx: &Context) -> Result<Dashboard<FileStore>, Box<dyn std::error::Error>> {
    let config = config_io::read_config(&ctx.data_dir)?;
    let mut store = FileStore::open(&ctx.data_dir)?;
    let clock = SystemClock;
    let backup_dir = ctx.data_dir.join("backups");
    if let Err(e) = export::backup_if_due(&mut store, &backup_dir, clock.today(), &config.backup) {
        log::warn!("automatic backup failed: {}", e);
    }
    Ok(Dashboard::open(store, Box::new(clock), config))
}

/// Open, run `f`, and save on success. A failed command saves nothing.
fn with_dashboard<F>(ctx: &Context, f: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(&mut Dashboard<FileStore>) -> Result<(), Box<dyn std::error::Error>>,
{
    let mut dash = open_dashboard(ctx)?;
    f(&mut dash)?;
    dash.close()?;
    Ok(())
}

/// `YYYY-MM-DD`, `today` or `tomorrow`
pub fn parse_due(s: &str, today: NaiveDate) -> Result<NaiveDate, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "today" => Ok(today),
        "tomorrow" => today
            .succ_opt()
            .ok_or_else(|| "date out of range".to_string()),
        other => due_date::parse(other)
            .map_err(|_| format!("invalid date '{}' (expected YYYY-MM-DD)", s)),
    }
}

pub fn parse_reminder(s: &str) -> Result<chrono::NaiveDateTime, String> {
    reminder_time::parse(s.trim())
        .map_err(|_| format!("invalid reminder '{}' (expected YYYY-MM-DD HH:MM)", s))
}

pub fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::parse(s)
        .ok_or_else(|| format!("unknown priority '{}' (expected: low, normal, high)", s))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

pub fn cmd_list<S: KeyValueStore>(
    dash: &Dashboard<S>,
    args: ListArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // A one-shot listing filters a copy so the caller's view is untouched
    let mut filter = dash.filter().clone();
    if let Some(project) = args.project.as_deref() {
        let selection = ProjectSelection::parse(project);
        if let ProjectSelection::Project(id) = &selection {
            if !dash.projects().iter().any(|p| &p.id == id) {
                return Err(format!("unknown project: {}", id).into());
            }
        }
        filter.project = selection;
    }
    if let Some(search) = args.search {
        filter.search = search;
    }
    filter.due_today |= args.today;
    filter.sort_by_due |= args.sort_due;

    let today = dash.today();
    let view = project_view(dash.tasks(), &filter, today);
    if json {
        let tasks: Vec<TaskJson> = view.iter().map(|t| task_to_json(t, today)).collect();
        return print_json(&tasks);
    }
    print_view(dash, &view);
    Ok(())
}

fn print_view<S: KeyValueStore>(dash: &Dashboard<S>, view: &[&Task]) {
    let lines = format_task_list(
        view,
        dash.today(),
        dash.projects(),
        dash.config().ui.compact,
        dash.tasks().is_empty(),
    );
    for line in &lines {
        println!("{}", line);
    }
}

fn cmd_stats<S: KeyValueStore>(
    dash: &Dashboard<S>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let stats = dash.stats();
    let streak = dash.streak().count;
    if json {
        return print_json(&stats_to_json(
            &stats,
            dash.projects(),
            dash.goal(),
            dash.goal_progress(),
            streak,
        ));
    }
    for line in format_stats(
        &stats,
        dash.projects(),
        dash.goal(),
        dash.goal_progress(),
        streak,
    ) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_streak<S: KeyValueStore>(
    dash: &Dashboard<S>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        return print_json(&streak_to_json(dash.streak(), dash.today()));
    }
    println!("{}", format_streak(dash.streak(), dash.today()));
    Ok(())
}

fn cmd_remind<S: KeyValueStore>(
    dash: &Dashboard<S>,
    args: RemindArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let due = match args.at.as_deref() {
        Some(at) => due_reminders(dash.tasks(), parse_reminder(at)?),
        None => dash.due_reminders(),
    };
    if json {
        let today = dash.today();
        let tasks: Vec<TaskJson> = due.iter().map(|t| task_to_json(t, today)).collect();
        return print_json(&tasks);
    }
    if due.is_empty() {
        println!("no reminders due");
    }
    for task in due {
        println!("reminder: {} {}", task.id, task.text);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Task mutations
// ---------------------------------------------------------------------------

fn cmd_add<S: KeyValueStore>(
    dash: &mut Dashboard<S>,
    args: AddArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (text, tags) = parse_text_and_tags(&args.text.join(" "));
    let today = dash.today();
    let new = NewTask {
        text,
        tags,
        project_id: args.project,
        due_date: args.due.as_deref().map(|d| parse_due(d, today)).transpose()?,
        reminder_time: args.remind.as_deref().map(parse_reminder).transpose()?,
        notes: args.notes.unwrap_or_default(),
        priority: args
            .priority
            .as_deref()
            .map(parse_priority)
            .transpose()?
            .unwrap_or_default(),
    };
    let id = dash.add_task(new)?;
    if json {
        return print_json(&AddedJson { id });
    }
    println!("{}", id);
    Ok(())
}

fn cmd_edit<S: KeyValueStore>(
    dash: &mut Dashboard<S>,
    args: EditArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let today = dash.today();
    let due_date = if args.clear_due {
        Some(None)
    } else {
        args.due
            .as_deref()
            .map(|d| parse_due(d, today).map(Some))
            .transpose()?
    };
    let reminder_time = if args.clear_remind {
        Some(None)
    } else {
        args.remind
            .as_deref()
            .map(|r| parse_reminder(r).map(Some))
            .transpose()?
    };
    let edit = TaskEdit {
        text: args.text,
        notes: args.notes,
        project_id: args.project,
        due_date,
        reminder_time,
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
        tags: if args.tag.is_empty() {
            None
        } else {
            Some(args.tag)
        },
    };
    if edit.is_empty() {
        return Err("nothing to change (see `focus edit --help`)".into());
    }
    dash.edit_task(&args.id, &edit)?;
    Ok(())
}

fn cmd_done<S: KeyValueStore>(
    dash: &mut Dashboard<S>,
    args: IdsArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    ensure_all_exist(dash, &args.ids)?;
    for id in &args.ids {
        dash.toggle_done(id)?;
        let done = dash.task(id).is_some_and(|t| t.done);
        println!("{} {}", id, if done { "done" } else { "reopened" });
    }
    Ok(())
}

fn cmd_star<S: KeyValueStore>(
    dash: &mut Dashboard<S>,
    args: IdArg,
) -> Result<(), Box<dyn std::error::Error>> {
    dash.toggle_star(&args.id)?;
    let starred = dash.task(&args.id).is_some_and(|t| t.starred);
    println!("{} {}", args.id, if starred { "starred" } else { "unstarred" });
    Ok(())
}

fn cmd_rm<S: KeyValueStore>(
    dash: &mut Dashboard<S>,
    args: IdsArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    ensure_all_exist(dash, &args.ids)?;
    for id in &args.ids {
        dash.delete_task(id)?;
        println!("deleted {}", id);
    }
    Ok(())
}

/// Every id must name a distinct existing task before any of them is touched
fn ensure_all_exist<S: KeyValueStore>(
    dash: &Dashboard<S>,
    ids: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(missing) = ids.iter().find(|id| dash.task(id).is_none()) {
        return Err(format!("task not found: {}", missing).into());
    }
    let mut seen = std::collections::HashSet::new();
    if let Some(repeated) = ids.iter().find(|id| !seen.insert(id.as_str())) {
        return Err(format!("task listed twice: {}", repeated).into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

fn cmd_project<S: KeyValueStore>(
    dash: &mut Dashboard<S>,
    args: ProjectCmd,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match args.action.unwrap_or(ProjectAction::List) {
        ProjectAction::List => {
            let stats = dash.stats();
            if json {
                let projects = stats_to_json(&stats, dash.projects(), 0, 0, 0).projects;
                return print_json(&projects);
            }
            for project in dash.projects() {
                let counts = stats.by_project.get(&project.id).copied().unwrap_or_default();
                println!(
                    "{}",
                    format_project_line(project, counts.total, counts.completed)
                );
            }
        }
        ProjectAction::Add(add) => {
            let id = dash.add_project(&add.name.join(" "), add.color.as_deref())?;
            if json {
                return print_json(&AddedJson { id });
            }
            println!("{}", id);
        }
        ProjectAction::Rm(rm) => {
            if !dash.delete_project(&rm.id) {
                return Err(format!("cannot delete project '{}'", rm.id).into());
            }
            println!("deleted project {} (tasks moved to inbox)", rm.id);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Notes and goal
// ---------------------------------------------------------------------------

fn cmd_note<S: KeyValueStore>(
    dash: &mut Dashboard<S>,
    args: NoteArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = args.text.join(" ");
    if args.clear {
        dash.set_notes(String::new());
    } else if args.append {
        if text.is_empty() {
            return Err("nothing to append".into());
        }
        dash.append_notes(&text);
    } else if !text.is_empty() {
        dash.set_notes(text);
    }
    if json {
        return print_json(&NotesJson {
            notes: dash.notes(),
        });
    }
    if !dash.notes().is_empty() {
        println!("{}", dash.notes());
    }
    Ok(())
}

fn cmd_goal<S: KeyValueStore>(
    dash: &mut Dashboard<S>,
    args: GoalArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(goal) = args.goal {
        dash.set_goal(goal)?;
    }
    let completed = dash.stats().completed;
    if json {
        return print_json(&GoalJson {
            goal: dash.goal(),
            completed,
            percent: dash.goal_progress(),
        });
    }
    println!(
        "{}/{} {}",
        completed,
        dash.goal(),
        format_progress_bar(dash.goal_progress())
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Pomodoro
// ---------------------------------------------------------------------------

fn cmd_pomodoro<S: KeyValueStore>(
    dash: &mut Dashboard<S>,
    args: PomodoroCmd,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match args.action.unwrap_or(PomodoroAction::Status) {
        PomodoroAction::Status => {}
        PomodoroAction::Start => dash.start_timer(),
        PomodoroAction::Pause => dash.pause_timer(),
        PomodoroAction::Reset => dash.reset_timer(),
        PomodoroAction::Mode(m) => {
            let mode = TimerMode::parse(&m.mode).ok_or_else(|| {
                format!(
                    "unknown mode '{}' (expected: pomodoro, short-break, long-break)",
                    m.mode
                )
            })?;
            dash.set_timer_mode(mode);
        }
        PomodoroAction::Run(run) => return run_timer(dash, run.tick_ms, json),
    }
    if json {
        return print_json(&pomodoro_to_json(dash.timer()));
    }
    println!("{}", format_pomodoro(dash.timer()));
    Ok(())
}

/// Count down in the foreground until the current mode finishes.
fn run_timer<S: KeyValueStore>(
    dash: &mut Dashboard<S>,
    tick_ms: u64,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    dash.start_timer();
    if !json {
        println!("{}", format_pomodoro(dash.timer()));
    }
    let tick = loop {
        if tick_ms > 0 {
            thread::sleep(Duration::from_millis(tick_ms));
        }
        if let Some(tick) = dash.tick_timer() {
            break tick;
        }
        if !json && dash.timer().remaining % 60 == 0 {
            print!("\r{}", format_pomodoro(dash.timer()));
            std::io::stdout().flush()?;
        }
    };
    if json {
        return print_json(&pomodoro_to_json(dash.timer()));
    }
    println!();
    match tick.event {
        TimerEvent::PomodoroComplete { cycles } => {
            println!("pomodoro complete ({} total)", cycles);
            if let Some(id) = tick.completed_task {
                println!("{} done", id);
            }
        }
        TimerEvent::BreakFinished => println!("break over"),
    }
    println!("next: {}", format_pomodoro(dash.timer()));
    Ok(())
}

// ---------------------------------------------------------------------------
// Import / export
// ---------------------------------------------------------------------------

fn cmd_export(ctx: &Context, args: ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::open(&ctx.data_dir)?;
    let path = match args.path {
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(format!(
            "focusspace_export_{}.json",
            SystemClock.today().format(due_date::FORMAT)
        )),
    };
    export::export_to(&store, &path)?;
    if ctx.json {
        return print_json(&TransferJson {
            path: path.display().to_string(),
            keys: Vec::new(),
        });
    }
    println!("exported to {}", path.display());
    Ok(())
}

fn cmd_import(ctx: &Context, args: ImportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = FileStore::open(&ctx.data_dir)?;
    let path = PathBuf::from(&args.path);
    let keys = export::import_from(&mut store, &path)?;
    if ctx.json {
        return print_json(&TransferJson {
            path: path.display().to_string(),
            keys,
        });
    }
    println!("imported {} ({})", path.display(), keys.join(", "));
    Ok(())
}

/// Config for the data directory, or defaults if it can't be read. Used
/// before logging is up, where a bad config should still surface later.
pub fn config_or_default(data_dir: &Path) -> Config {
    config_io::read_config(data_dir).unwrap_or_default()
}
