use anyhow::Result;
use cadence_core::repository::InMemoryRepository;
use cadence_core::service::SchedulingService;
use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;

use crate::cli::CompleteCommand;
use crate::util::resolve_task;
use crate::views::table::format_due;

pub async fn complete_task(
    service: &SchedulingService<InMemoryRepository>,
    command: CompleteCommand,
    now: DateTime<Utc>,
) -> Result<()> {
    let task = resolve_task(service.repository(), &command.id).await?;
    let update = service.complete_task(task.id, now).await?;

    println!("Completed task: '{}'", update.task.name);
    match (&update.advancement, update.task.due_date) {
        (Some(advancement), Some(next)) if advancement.advanced => {
            println!("Next occurrence: {}", format_due(next, now).green());
        }
        (Some(_), _) => println!("{}", "Recurrence has ended.".yellow()),
        (None, _) => {}
    }
    Ok(())
}
