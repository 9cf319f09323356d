use anyhow::Result;
use cadence_core::recurrence::next_date;
use cadence_core::repository::InMemoryRepository;
use cadence_core::service::SchedulingService;
use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;

use crate::cli::NextCommand;
use crate::parser::parse_date;
use crate::util::resolve_task;
use crate::views::table::format_due;

pub async fn next_occurrence(
    service: &SchedulingService<InMemoryRepository>,
    command: NextCommand,
    now: DateTime<Utc>,
) -> Result<()> {
    let task = resolve_task(service.repository(), &command.id).await?;
    if !task.recurrence.is_recurring() {
        println!("Task '{}' does not recur.", task.name);
        return Ok(());
    }

    let from = match command.from.as_deref() {
        Some(s) => parse_date(s, now)?,
        None => task.due_date.unwrap_or(now),
    };

    match next_date(&task.recurrence, from) {
        Some(next) if task.recurrence.permits(next) => {
            println!("Next occurrence of '{}': {}", task.name, format_due(next, now).green());
        }
        Some(next) => {
            println!(
                "Recurrence of '{}' has ended; {} is past its end date.",
                task.name,
                next.format("%Y-%m-%d")
            );
        }
        None => println!("No further occurrences for '{}'.", task.name),
    }
    Ok(())
}
