use std::collections::HashSet;
use std::io::{BufRead, IsTerminal, Write};

use clap::{CommandFactory, Parser};

use crate::cli::commands::{BulkAction, FilterArgs, ShellArgs, ShellCommand, ShellLine};
use crate::cli::handlers::{
    Context, cmd_add, cmd_done, cmd_edit, cmd_goal, cmd_note, cmd_pomodoro, cmd_project,
    cmd_remind, cmd_rm, cmd_star, cmd_stats, cmd_streak, open_dashboard, print_view,
};
use crate::dashboard::Dashboard;
use crate::io::config_io;
use crate::io::kv_store::{FileStore, KeyValueStore, MemoryStore, keys};
use crate::model::project::ProjectSelection;
use crate::util::clock::SystemClock;

const PROMPT: &str = "focus> ";

/// Whether the session continues after a line
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Interactive session over one dashboard. State is saved after every line
/// so a killed session loses at most the line in flight; undo history lives
/// only as long as the session. `--dry-run` runs the same session over an
/// in-memory copy of the data directory.
pub fn cmd_shell(ctx: &Context, args: ShellArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.dry_run {
        return run_session(open_dashboard(ctx)?, ctx.json);
    }
    let config = config_io::read_config(&ctx.data_dir)?;
    let files = FileStore::open(&ctx.data_dir)?;
    let dash = Dashboard::open(snapshot(&files)?, Box::new(SystemClock), config);
    log::info!("shell dry run over {}", ctx.data_dir.display());
    run_session(dash, ctx.json)
}

/// Copy every known key into a fresh in-memory store
fn snapshot<S: KeyValueStore>(source: &S) -> Result<MemoryStore, Box<dyn std::error::Error>> {
    let mut copy = MemoryStore::new();
    for key in keys::ALL {
        if let Some(value) = source.read_raw(key)? {
            copy.write_raw(key, &value)?;
        }
    }
    Ok(copy)
}

fn run_session<S: KeyValueStore>(
    mut dash: Dashboard<S>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();
    let mut notified: HashSet<String> = HashSet::new();

    if interactive {
        println!("focusspace shell: `help` lists commands, `quit` leaves");
    }
    loop {
        if interactive {
            print!("{}", PROMPT);
            std::io::stdout().flush()?;
        }
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let words = match split_line(&line) {
            Ok(words) => words,
            Err(e) => {
                eprintln!("error: {}", e);
                continue;
            }
        };
        if words.is_empty() {
            continue;
        }
        let command = match ShellLine::try_parse_from(&words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                eprint!("{}", e);
                continue;
            }
        };

        let flow = match run_line(&mut dash, command, json) {
            Ok(flow) => flow,
            Err(e) => {
                eprintln!("error: {}", e);
                Flow::Continue
            }
        };
        dash.save()?;
        announce_reminders(&dash, &mut notified);
        if flow == Flow::Quit {
            break;
        }
    }
    dash.close()?;
    Ok(())
}

/// Split a shell line into words. Unquoted `#` starts a tag here, not a
/// comment, so it is escaped before handing the line to `shell_words`.
fn split_line(line: &str) -> Result<Vec<String>, shell_words::ParseError> {
    shell_words::split(&escape_tag_marks(line))
}

fn escape_tag_marks(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 4);
    let mut in_single = false;
    let mut in_double = false;
    let mut word_start = true;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' if !in_single => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
                word_start = false;
                continue;
            }
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '#' if word_start && !in_single && !in_double => out.push('\\'),
            _ => {}
        }
        out.push(c);
        word_start = c.is_whitespace() && !in_single && !in_double;
    }
    out
}

fn run_line<S: KeyValueStore>(
    dash: &mut Dashboard<S>,
    command: ShellCommand,
    json: bool,
) -> Result<Flow, Box<dyn std::error::Error>> {
    match command {
        ShellCommand::View => print_view(dash, &dash.view()),
        ShellCommand::Add(args) => cmd_add(dash, args, json)?,
        ShellCommand::Edit(args) => cmd_edit(dash, args)?,
        ShellCommand::Done(args) => cmd_done(dash, args)?,
        ShellCommand::Star(args) => cmd_star(dash, args)?,
        ShellCommand::Rm(args) => cmd_rm(dash, args)?,
        ShellCommand::Undo => {
            if dash.undo() {
                println!("undone");
            } else {
                println!("nothing to undo");
            }
        }
        ShellCommand::Redo => {
            if dash.redo() {
                println!("redone");
            } else {
                println!("nothing to redo");
            }
        }
        ShellCommand::Select(arg) => {
            let selected = dash.toggle_select(&arg.id)?;
            println!(
                "{} {} ({} selected)",
                if selected { "selected" } else { "deselected" },
                arg.id,
                dash.selection().len()
            );
        }
        ShellCommand::Bulk(bulk) => match bulk.action {
            BulkAction::Done => println!("{} tasks done", dash.bulk_complete()),
            BulkAction::Rm => println!("{} tasks deleted", dash.bulk_delete()),
            BulkAction::Clear => {
                dash.clear_selection();
                println!("selection cleared");
            }
        },
        ShellCommand::Filter(args) => {
            apply_filter(dash, args)?;
            print_view(dash, &dash.view());
        }
        ShellCommand::Project(args) => cmd_project(dash, args, json)?,
        ShellCommand::Stats => cmd_stats(dash, json)?,
        ShellCommand::Streak => cmd_streak(dash, json)?,
        ShellCommand::Note(args) => cmd_note(dash, args, json)?,
        ShellCommand::Goal(args) => cmd_goal(dash, args, json)?,
        ShellCommand::Pomodoro(args) => cmd_pomodoro(dash, args, json)?,
        ShellCommand::Remind(args) => cmd_remind(dash, args, json)?,
        ShellCommand::Help => print_help(),
        ShellCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn apply_filter<S: KeyValueStore>(
    dash: &mut Dashboard<S>,
    args: FilterArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if args.reset {
        dash.select_project(ProjectSelection::All)?;
        dash.set_search("");
        dash.set_due_today(false);
        dash.set_sort_by_due(false);
    }
    if let Some(project) = args.project.as_deref() {
        dash.select_project(ProjectSelection::parse(project))?;
    }
    if let Some(search) = args.search {
        dash.set_search(search);
    }
    if let Some(today) = args.today {
        dash.set_due_today(today);
    }
    if let Some(sort_due) = args.sort_due {
        dash.set_sort_by_due(sort_due);
    }
    Ok(())
}

fn print_help() {
    let cmd = ShellLine::command();
    for sub in cmd.get_subcommands() {
        let about = sub.get_about().map(|a| a.to_string()).unwrap_or_default();
        println!("  {:<10} {}", sub.get_name(), about);
    }
}

/// Print each due reminder once per task and reminder time
fn announce_reminders<S: KeyValueStore>(dash: &Dashboard<S>, notified: &mut HashSet<String>) {
    for task in dash.due_reminders() {
        let key = format!("{}@{:?}", task.id, task.reminder_time);
        if notified.insert(key) {
            println!("reminder: {}", task.text);
        }
    }
}
