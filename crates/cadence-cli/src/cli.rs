use cadence_core::models::{RecurrenceType, TaskPriority, TaskStatus};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Recurring-task scheduler working on a JSON task file
#[derive(Parser, Debug)]
#[command(name = "cadence", author, version, about, long_about = None)]
pub struct Cli {
    /// Task file to operate on (overrides configuration)
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a new task
    Add(AddCommand),
    /// List stored tasks
    List(ListCommand),
    /// Preview upcoming occurrences of a recurring task
    Preview(PreviewCommand),
    /// Show the next occurrence after a date
    Next(NextCommand),
    /// Show virtual occurrences of all recurring tasks
    Upcoming(UpcomingCommand),
    /// Mark a task as done
    Complete(CompleteCommand),
    /// Edit a task
    Edit(EditCommand),
    /// Delete a task
    Delete(DeleteCommand),
}

/// Recurrence flags shared by `add` and `edit`
#[derive(Args, Debug, Clone, Default)]
pub struct RecurrenceArgs {
    /// Recurrence frequency (none, daily, weekly, monthly)
    #[arg(long)]
    pub every: Option<RecurrenceType>,
    /// Repeat every N days, weeks or months
    #[arg(long)]
    pub interval: Option<u32>,
    /// Weekday for weekly recurrence; repeat for a set (mon, tue, ... or 0-6)
    #[arg(long, num_args = 1..)]
    pub weekday: Vec<String>,
    /// Day of month for monthly recurrence
    #[arg(long)]
    pub month_day: Option<u8>,
    /// Last date an occurrence may fall on
    #[arg(long)]
    pub until: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The name of the task
    pub name: String,
    /// The description of the task
    #[arg(short, long)]
    pub description: Option<String>,
    /// The due date of the task
    #[arg(short = 'D', long)]
    pub due: Option<String>,
    /// The priority of the task
    #[arg(long)]
    pub priority: Option<TaskPriority>,
    /// Compute the next date from the completion time instead of the due date
    #[arg(long)]
    pub completion_based: bool,
    #[command(flatten)]
    pub recurrence: RecurrenceArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// Only show tasks with these statuses
    #[arg(long, num_args = 1..)]
    pub status: Vec<TaskStatus>,
}

#[derive(Parser, Debug, Clone)]
pub struct PreviewCommand {
    /// The ID (or ID prefix) of the task
    pub id: String,
    /// Start the preview from this date instead of today
    #[arg(long)]
    pub from: Option<String>,
    /// IANA timezone to render dates in
    #[arg(long)]
    pub tz: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct NextCommand {
    /// The ID (or ID prefix) of the task
    pub id: String,
    /// Reference date (defaults to the task's due date)
    #[arg(long)]
    pub from: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct UpcomingCommand {
    /// Horizon in days (overrides configuration)
    #[arg(long)]
    pub window: Option<u32>,
    /// Statuses being listed; virtual occurrences are always not_started
    #[arg(long, num_args = 1..)]
    pub status: Vec<TaskStatus>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompleteCommand {
    /// The ID (or ID prefix) of the task to complete
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct EditCommand {
    /// The ID (or ID prefix) of the task to edit
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, conflicts_with = "description")]
    pub description_clear: bool,

    #[arg(long)]
    pub note: Option<String>,
    #[arg(long, conflicts_with = "note")]
    pub note_clear: bool,

    #[arg(long)]
    pub due: Option<String>,

    #[arg(long)]
    pub priority: Option<TaskPriority>,

    #[arg(long)]
    pub status: Option<TaskStatus>,

    #[command(flatten)]
    pub recurrence: RecurrenceArgs,
    #[arg(long, conflicts_with = "until")]
    pub until_clear: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID (or ID prefix) of the task to delete
    pub id: String,
}
