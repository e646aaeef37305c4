//! Terminal front-end for the study planner.
//!
//! # Responsibility
//! - Parse commands and render planner views as plain text.
//! - Own presentation concerns: delete confirmation, formatting, printing
//!   reminder notifications.
//!
//! # Invariants
//! - Every state change goes through `study_planner_core::Planner`.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use study_planner_core::db::open_db;
use study_planner_core::logging::init_logging_from_config;
use study_planner_core::{
    due_date_label, format_relative_time, task_status, AchievementKind, Clock, KeyValueStore,
    MemoryKeyValueStore, Notifier, Planner, PlannerConfig, PlannerResult, Priority,
    ReminderScheduler, SqliteKeyValueStore, Subject, SystemClock, Task, TaskDraft, TaskFilter,
    TaskPatch, TaskStatus,
};

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "study-planner", version, about = "Plan study tasks and track weekly goals")]
struct Cli {
    /// SQLite database file. Defaults to the per-user data directory.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Keep state in memory for this run only; nothing is saved.
    #[arg(long, global = true, conflicts_with = "db")]
    ephemeral: bool,

    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Absolute directory for rolling log files.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a task.
    Add {
        title: String,
        #[arg(long)]
        subject: Subject,
        /// Due date, YYYY-MM-DD.
        #[arg(long)]
        due: NaiveDate,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Estimated study hours.
        #[arg(long, default_value_t = 0.0)]
        hours: f64,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Edit fields of an existing task.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        subject: Option<Subject>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long)]
        hours: Option<f64>,
    },

    /// List tasks, incomplete first.
    List(ListArgs),

    /// Mark a task complete, or incomplete again.
    Toggle { id: String },

    /// Delete a task.
    Delete {
        id: String,
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },

    /// Show or change the weekly study goal.
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },

    /// Print a month calendar with due-task markers.
    Calendar {
        /// Month to show, YYYY-MM. Defaults to the current month.
        #[arg(long, value_parser = parse_month)]
        month: Option<NaiveDate>,
    },

    /// Summary of stats, goal, upcoming work and recent activity.
    Dashboard,

    /// Check for overdue tasks and print a reminder.
    Remind {
        /// Keep checking on the configured interval.
        #[arg(long)]
        watch: bool,
    },
}

#[derive(Args)]
struct ListArgs {
    /// Case-insensitive text searched in title and description.
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long)]
    subject: Option<Subject>,
    #[arg(long)]
    priority: Option<Priority>,
    /// pending | overdue | completed
    #[arg(long)]
    status: Option<TaskStatus>,
}

#[derive(Subcommand)]
enum GoalAction {
    /// Set the weekly target in hours.
    Set { hours: f64 },
    /// Show progress toward the weekly target.
    Show,
}

/// Prints reminders to stdout.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn is_permitted(&self) -> bool {
        true
    }

    fn notify(&mut self, title: &str, body: &str) {
        println!("[{title}] {body}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let mut config = match &cli.config {
        Some(path) => PlannerConfig::load(path)?,
        None => PlannerConfig::default(),
    };
    if cli.log_dir.is_some() {
        config.log_dir = cli.log_dir;
    }
    if cli.db.is_some() {
        config.database_path = cli.db;
    }
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("warning: file logging disabled: {err}");
    }

    if cli.ephemeral {
        info!("event=cli_start module=cli status=ok store=memory");
        let mut planner = Planner::load(MemoryKeyValueStore::new(), SystemClock, config)?;
        return execute(&mut planner, cli.command);
    }

    let path = config.resolved_database_path()?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let conn = open_db(&path)?;
    info!("event=cli_start module=cli status=ok store=sqlite");

    if let Commands::Remind { watch: true } = cli.command {
        let interval_secs = config.reminder_interval_secs;
        return watch_reminders(
            || Planner::load(SqliteKeyValueStore::new(&conn), SystemClock, config.clone()),
            interval_secs,
        );
    }
    let mut planner = Planner::load(SqliteKeyValueStore::new(&conn), SystemClock, config)?;
    execute(&mut planner, cli.command)
}

/// Re-reads planner state before every check so changes made by other
/// invocations against the same database are seen.
fn watch_reminders<S, C, F>(mut load: F, interval_secs: u64) -> CliResult<()>
where
    S: KeyValueStore,
    C: Clock,
    F: FnMut() -> PlannerResult<Planner<S, C>>,
{
    let mut scheduler = ReminderScheduler::from_secs(interval_secs);
    let mut notifier = TerminalNotifier;
    loop {
        let planner = load()?;
        report_reminders(&planner, &mut scheduler, &mut notifier);
        std::thread::sleep(std::time::Duration::from_secs(interval_secs.max(1)));
    }
}

fn report_reminders<S: KeyValueStore, C: Clock>(
    planner: &Planner<S, C>,
    scheduler: &mut ReminderScheduler,
    notifier: &mut TerminalNotifier,
) {
    if let Some(summary) = planner.check_reminders(scheduler, notifier) {
        if summary.message().is_none() {
            println!("no overdue tasks; {} due today", summary.due_today);
        }
    }
}

fn execute<S: KeyValueStore, C: Clock>(
    planner: &mut Planner<S, C>,
    command: Commands,
) -> CliResult<()> {
    match command {
        Commands::Add {
            title,
            subject,
            due,
            priority,
            hours,
            description,
        } => {
            let draft = TaskDraft::new(title, subject, due)
                .with_priority(priority)
                .with_estimated_hours(hours)
                .with_description(description);
            let change = planner.add_task(&draft)?;
            println!("created {}", change.task.id);
            print_unlocked(&change.unlocked);
        }
        Commands::Edit {
            id,
            title,
            description,
            subject,
            priority,
            due,
            hours,
        } => {
            let patch = TaskPatch {
                title,
                description,
                subject,
                priority,
                due_date: due,
                estimated_hours: hours,
            };
            if patch.is_empty() {
                return Err("nothing to change; pass at least one field flag".into());
            }
            let change = planner.update_task(&id, &patch)?;
            println!("updated {}", change.task.id);
        }
        Commands::List(args) => {
            let filter = TaskFilter {
                search_term: args.search,
                subject: args.subject,
                priority: args.priority,
                status: args.status,
            };
            let now = planner.now();
            let tasks = planner.filtered_tasks(&filter);
            if tasks.is_empty() {
                println!("no tasks");
            }
            for task in tasks {
                println!("{}", task_line(task, now));
            }
        }
        Commands::Toggle { id } => {
            let change = planner.toggle_complete(&id)?;
            let state = if change.task.completed {
                "completed"
            } else {
                "reopened"
            };
            println!("{state}: {}", change.task.title);
            print_unlocked(&change.unlocked);
        }
        Commands::Delete { id, yes } => {
            if !yes {
                return Err(format!("refusing to delete {id} without --yes").into());
            }
            let task = planner.delete_task(&id)?;
            println!("deleted: {}", task.title);
        }
        Commands::Goal { action } => match action {
            GoalAction::Set { hours } => {
                let unlocked = planner.set_weekly_goal(hours)?;
                println!("weekly goal set to {hours}h");
                print_unlocked(&unlocked);
            }
            GoalAction::Show => {
                let goal = planner.refresh_goal()?;
                println!(
                    "week of {}: {:.1}h / {:.1}h ({:.0}%)",
                    goal.week_start,
                    goal.current_hours,
                    goal.weekly_hours,
                    goal.progress_percent()
                );
            }
        },
        Commands::Calendar { month } => {
            let month = month.unwrap_or_else(|| planner.now().date());
            print_calendar(planner, month);
        }
        Commands::Dashboard => print_dashboard(planner)?,
        Commands::Remind { watch } => {
            let interval_secs = planner.config().reminder_interval_secs;
            let mut scheduler = ReminderScheduler::from_secs(interval_secs);
            let mut notifier = TerminalNotifier;
            loop {
                report_reminders(planner, &mut scheduler, &mut notifier);
                if !watch {
                    break;
                }
                std::thread::sleep(std::time::Duration::from_secs(interval_secs.max(1)));
            }
        }
    }
    Ok(())
}

fn parse_month(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM, got `{value}`"))
}

fn task_line(task: &Task, now: NaiveDateTime) -> String {
    let mark = if task.completed { "x" } else { " " };
    let due = match task_status(task, now) {
        TaskStatus::Completed => "done".to_string(),
        _ => due_date_label(task.due_date, now),
    };
    format!(
        "[{mark}] {:<32} {:<12} {:<6} {:>5.1}h  {:<16} {}",
        task.title, task.subject, task.priority, task.estimated_hours, due, task.id
    )
}

fn print_unlocked(unlocked: &[AchievementKind]) {
    for kind in unlocked {
        println!("achievement unlocked: {} - {}", kind.title(), kind.description());
    }
}

fn print_calendar<S: KeyValueStore, C: Clock>(planner: &Planner<S, C>, month: NaiveDate) {
    let view = planner.calendar_month(month);
    println!("{:^28}", view.title);
    println!(" Su  Mo  Tu  We  Th  Fr  Sa");
    for week in view.days.chunks(7) {
        let row: Vec<String> = week
            .iter()
            .map(|day| {
                let number = if day.in_current_month {
                    format!("{:>2}", day.date.day())
                } else {
                    "  ".to_string()
                };
                let marker = match (day.is_today, day.task_count) {
                    (true, _) => '<',
                    (false, 0) => ' ',
                    (false, _) => '*',
                };
                format!(" {number}{marker}")
            })
            .collect();
        println!("{}", row.concat());
    }
    println!("* tasks due   < today");
}

fn print_dashboard<S: KeyValueStore, C: Clock>(planner: &mut Planner<S, C>) -> CliResult<()> {
    let goal = planner.refresh_goal()?.clone();
    let now = planner.now();
    let stats = planner.stats();

    println!(
        "tasks: {} total, {} completed, {} pending, {} overdue, {} due today ({}% done)",
        stats.total,
        stats.completed,
        stats.pending,
        stats.overdue,
        stats.due_today,
        stats.progress_percent
    );
    println!(
        "weekly goal: {:.1}h / {:.1}h ({:.0}%)",
        goal.current_hours,
        goal.weekly_hours,
        goal.progress_percent()
    );

    println!("\nupcoming:");
    let upcoming = planner.upcoming();
    if upcoming.is_empty() {
        println!("  nothing due");
    }
    for task in upcoming {
        println!("  {} ({})", task.title, due_date_label(task.due_date, now));
    }

    println!("\nachievements:");
    for (kind, unlocked) in planner.achievements().iter() {
        let mark = if unlocked { "x" } else { " " };
        println!("  [{mark}] {}", kind.title());
    }

    println!("\nrecent activity:");
    let recent = planner.recent_activity();
    if recent.is_empty() {
        println!("  none yet");
    }
    for entry in recent {
        println!(
            "  {} ({})",
            entry.action,
            format_relative_time(entry.timestamp, now)
        );
    }

    let summary = planner.reminder_summary();
    if let Some(message) = summary.message() {
        println!("\n{message}");
    }
    Ok(())
}
