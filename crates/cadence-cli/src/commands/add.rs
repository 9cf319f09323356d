use anyhow::Result;
use cadence_core::models::{Patch, RecurrenceType, Task, TaskPatch};
use cadence_core::recurrence::weekday_index;
use cadence_core::repository::InMemoryRepository;
use cadence_core::service::SchedulingService;
use chrono::{DateTime, Utc};

use crate::cli::AddCommand;
use crate::parser::parse_date;
use crate::util::short_id;

use super::apply_recurrence_args;

pub async fn add_task(
    service: &SchedulingService<InMemoryRepository>,
    command: AddCommand,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut patch = TaskPatch {
        name: Some(command.name),
        description: command.description.into(),
        priority: command.priority,
        completion_based: command.completion_based.then_some(true),
        ..Default::default()
    };
    if let Some(due) = &command.due {
        patch.due_date = Patch::Value(parse_date(due, now)?);
    }
    apply_recurrence_args(&command.recurrence, &mut patch, now)?;

    let mut task = patch.apply_to(&Task::default());
    if task.recurrence.is_recurring() && task.due_date.is_none() {
        task.due_date = Some(now);
    }
    // A weekly task with no weekday recurs on its due date's weekday.
    if task.recurrence.recurrence_type == RecurrenceType::Weekly
        && task.recurrence.weekday_set().is_none()
        && task.recurrence.recurrence_weekday.is_none()
    {
        task.recurrence.recurrence_weekday = task.due_date.map(weekday_index);
    }

    let task = service.repository().insert_task(task).await;
    tracing::info!(task_id = %task.id, "task added");
    println!("Added task '{}' ({})", task.name, short_id(&task));
    Ok(())
}
