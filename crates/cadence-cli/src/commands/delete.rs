use anyhow::Result;
use cadence_core::repository::InMemoryRepository;
use cadence_core::service::SchedulingService;
use chrono::{DateTime, Utc};

use crate::cli::DeleteCommand;
use crate::util::resolve_task;

pub async fn delete_task(
    service: &SchedulingService<InMemoryRepository>,
    command: DeleteCommand,
    now: DateTime<Utc>,
) -> Result<()> {
    let task = resolve_task(service.repository(), &command.id).await?;
    let summary = service.delete_task(task.id, now).await?;

    println!("Deleted task: '{}'", task.name);
    if task.is_template() {
        println!(
            "Instances: {} deleted, {} kept as standalone tasks, {} skipped",
            summary.deleted, summary.detached, summary.skipped
        );
    }
    Ok(())
}
