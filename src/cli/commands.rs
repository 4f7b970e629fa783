use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "focus", about = concat!("focusspace v", env!("CARGO_PKG_VERSION"), " - tasks, streaks and a pomodoro timer"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'D', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory and a commented config.toml
    Init(InitArgs),
    /// List tasks (default when no command is given)
    List(ListArgs),
    /// Add a task; trailing #words become tags
    Add(AddArgs),
    /// Change fields of a task
    Edit(EditArgs),
    /// Toggle tasks done
    Done(IdsArgs),
    /// Toggle a task's star
    Star(IdArg),
    /// Delete tasks
    Rm(IdsArgs),
    /// List, add or remove projects
    Project(ProjectCmd),
    /// Show task counts and goal progress
    Stats,
    /// Show the completion streak
    Streak,
    /// Show or change the quick notes
    Note(NoteArgs),
    /// Show or set the daily goal
    Goal(GoalArgs),
    /// Pomodoro timer
    Pomodoro(PomodoroCmd),
    /// Show tasks whose reminder is due
    Remind(RemindArgs),
    /// Export everything to a JSON file
    Export(ExportArgs),
    /// Import a JSON export, overwriting what it contains
    Import(ImportArgs),
    /// Interactive session with undo/redo and bulk selection
    Shell(ShellArgs),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing config.toml
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args, Default)]
pub struct ListArgs {
    /// Only tasks in this project ("all" for every project)
    #[arg(long, short)]
    pub project: Option<String>,
    /// Case-insensitive search over text, tags and notes
    #[arg(long, short)]
    pub search: Option<String>,
    /// Only tasks due today
    #[arg(long)]
    pub today: bool,
    /// Dated tasks first, earliest due date first
    #[arg(long)]
    pub sort_due: bool,
}

#[derive(Args)]
pub struct RemindArgs {
    /// Check at this local time instead of now (YYYY-MM-DD HH:MM)
    #[arg(long)]
    pub at: Option<String>,
}

// ---------------------------------------------------------------------------
// Task mutation args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task text, with optional trailing #tags
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
    /// Project id (default: inbox)
    #[arg(long, short)]
    pub project: Option<String>,
    /// Due date (YYYY-MM-DD, today, tomorrow)
    #[arg(long)]
    pub due: Option<String>,
    /// Reminder (YYYY-MM-DD HH:MM)
    #[arg(long)]
    pub remind: Option<String>,
    /// Notes
    #[arg(long)]
    pub notes: Option<String>,
    /// Priority (low, normal, high)
    #[arg(long)]
    pub priority: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID
    pub id: String,
    /// New text
    #[arg(long)]
    pub text: Option<String>,
    /// New notes
    #[arg(long)]
    pub notes: Option<String>,
    /// Move to project
    #[arg(long)]
    pub project: Option<String>,
    /// Due date (YYYY-MM-DD, today, tomorrow)
    #[arg(long, conflicts_with = "clear_due")]
    pub due: Option<String>,
    /// Reminder (YYYY-MM-DD HH:MM)
    #[arg(long, conflicts_with = "clear_remind")]
    pub remind: Option<String>,
    /// Remove the due date
    #[arg(long)]
    pub clear_due: bool,
    /// Remove the reminder
    #[arg(long)]
    pub clear_remind: bool,
    /// Priority (low, normal, high)
    #[arg(long)]
    pub priority: Option<String>,
    /// Replace tags (repeatable)
    #[arg(long)]
    pub tag: Vec<String>,
}

#[derive(Args)]
pub struct IdsArgs {
    /// Task ID(s)
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,
}

#[derive(Args)]
pub struct IdArg {
    /// Task ID
    pub id: String,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ProjectCmd {
    #[command(subcommand)]
    pub action: Option<ProjectAction>,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// List projects (default)
    List,
    /// Create a project
    Add(ProjectAddArgs),
    /// Delete a project; its tasks move to the inbox
    Rm(ProjectRmArgs),
}

#[derive(Args)]
pub struct ProjectAddArgs {
    /// Project name
    #[arg(required = true, num_args = 1..)]
    pub name: Vec<String>,
    /// Hex color, e.g. #10b981
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Args)]
pub struct ProjectRmArgs {
    /// Project ID
    pub id: String,
}

// ---------------------------------------------------------------------------
// Notes and goal
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct NoteArgs {
    /// Replace the notes with this text (prints them if omitted)
    pub text: Vec<String>,
    /// Add the text as a new line instead of replacing
    #[arg(long)]
    pub append: bool,
    /// Erase the notes
    #[arg(long, conflicts_with = "append")]
    pub clear: bool,
}

#[derive(Args)]
pub struct GoalArgs {
    /// New daily goal (prints progress if omitted)
    pub goal: Option<u32>,
}

// ---------------------------------------------------------------------------
// Pomodoro
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct PomodoroCmd {
    #[command(subcommand)]
    pub action: Option<PomodoroAction>,
}

#[derive(Subcommand)]
pub enum PomodoroAction {
    /// Show mode, time left and cycles (default)
    Status,
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Stop and rewind the current mode
    Reset,
    /// Switch mode (pomodoro, short-break, long-break)
    Mode(ModeArgs),
    /// Run the countdown in the foreground until it finishes
    Run(RunArgs),
}

#[derive(Args)]
pub struct ModeArgs {
    /// pomodoro, short-break or long-break
    pub mode: String,
}

#[derive(Args)]
pub struct RunArgs {
    /// Milliseconds per tick
    #[arg(long, default_value_t = 1000, hide = true)]
    pub tick_ms: u64,
}

// ---------------------------------------------------------------------------
// Import / export
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ExportArgs {
    /// Output file (default: focusspace_export_<date>.json)
    pub path: Option<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// File written by `focus export`
    pub path: String,
}

// ---------------------------------------------------------------------------
// Shell
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ShellArgs {
    /// Work on an in-memory copy; nothing is written back
    #[arg(long)]
    pub dry_run: bool,
}

/// One line typed into `focus shell`
#[derive(Parser)]
#[command(
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand)]
pub enum ShellCommand {
    /// Show the current view
    #[command(alias = "ls")]
    View,
    /// Add a task
    Add(AddArgs),
    /// Change fields of a task
    Edit(EditArgs),
    /// Toggle tasks done
    Done(IdsArgs),
    /// Toggle a task's star
    Star(IdArg),
    /// Delete tasks
    Rm(IdsArgs),
    /// Undo the last task change
    Undo,
    /// Redo the last undone change
    Redo,
    /// Toggle a task in the bulk selection
    Select(IdArg),
    /// Apply an action to every selected task
    Bulk(BulkArgs),
    /// Change the view filter
    Filter(FilterArgs),
    /// Projects
    Project(ProjectCmd),
    /// Task counts and goal progress
    Stats,
    /// Completion streak
    Streak,
    /// Quick notes
    Note(NoteArgs),
    /// Daily goal
    Goal(GoalArgs),
    /// Pomodoro timer
    Pomodoro(PomodoroCmd),
    /// Due reminders
    Remind(RemindArgs),
    /// List shell commands
    Help,
    /// Save and leave
    #[command(alias = "exit")]
    Quit,
}

#[derive(Args)]
pub struct BulkArgs {
    #[command(subcommand)]
    pub action: BulkAction,
}

#[derive(Subcommand)]
pub enum BulkAction {
    /// Mark every selected task done
    Done,
    /// Delete every selected task
    Rm,
    /// Empty the selection
    Clear,
}

#[derive(Args)]
pub struct FilterArgs {
    /// Project id or "all"
    #[arg(long, short)]
    pub project: Option<String>,
    /// Search text ("" clears)
    #[arg(long, short)]
    pub search: Option<String>,
    /// Only tasks due today
    #[arg(long)]
    pub today: Option<bool>,
    /// Sort by due date
    #[arg(long)]
    pub sort_due: Option<bool>,
    /// Reset every filter
    #[arg(long)]
    pub reset: bool,
}
