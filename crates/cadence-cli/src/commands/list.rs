use anyhow::Result;
use cadence_core::repository::InMemoryRepository;
use cadence_core::service::SchedulingService;
use chrono::{DateTime, Utc};

use crate::cli::ListCommand;
use crate::views::table::display_tasks;

pub async fn list_tasks(
    service: &SchedulingService<InMemoryRepository>,
    command: ListCommand,
    now: DateTime<Utc>,
) -> Result<()> {
    let tasks: Vec<_> = service
        .repository()
        .all_tasks()
        .await
        .into_iter()
        .filter(|t| command.status.is_empty() || command.status.contains(&t.status))
        .collect();

    display_tasks(&tasks, now);
    Ok(())
}
