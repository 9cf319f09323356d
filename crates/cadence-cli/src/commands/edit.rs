use anyhow::{anyhow, Result};
use cadence_core::error::CoreError;
use cadence_core::models::{Patch, TaskPatch};
use cadence_core::repository::InMemoryRepository;
use cadence_core::service::SchedulingService;
use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;

use crate::cli::EditCommand;
use crate::parser::parse_date;
use crate::util::resolve_task;
use crate::views::table::format_due;

use super::apply_recurrence_args;

fn clearable(value: Option<String>, clear: bool) -> Patch<String> {
    match (value, clear) {
        (_, true) => Patch::Null,
        (Some(v), false) => Patch::Value(v),
        (None, false) => Patch::Unset,
    }
}

pub async fn edit_task(
    service: &SchedulingService<InMemoryRepository>,
    command: EditCommand,
    now: DateTime<Utc>,
) -> Result<()> {
    let task = resolve_task(service.repository(), &command.id).await?;

    let mut patch = TaskPatch {
        name: command.name,
        description: clearable(command.description, command.description_clear),
        note: clearable(command.note, command.note_clear),
        priority: command.priority,
        status: command.status,
        ..Default::default()
    };
    if let Some(due) = &command.due {
        patch.due_date = Patch::Value(parse_date(due, now)?);
    }
    apply_recurrence_args(&command.recurrence, &mut patch, now)?;
    if command.until_clear {
        patch.recurrence_end_date = Patch::Null;
    }

    if patch.is_empty() {
        return Err(anyhow!(CoreError::InvalidInput(
            "No changes specified".to_string()
        )));
    }

    let update = service.update_task(task.id, patch, now).await?;
    println!("Updated task: '{}'", update.task.name);

    if update.regenerated {
        println!(
            "{}",
            "Future instances removed; they will follow the new settings.".yellow()
        );
    }
    if let Some(advancement) = &update.advancement {
        match update.task.due_date.filter(|_| advancement.advanced) {
            Some(next) => println!("Next occurrence: {}", format_due(next, now).green()),
            None => println!("{}", "Recurrence has ended.".yellow()),
        }
    }
    Ok(())
}
