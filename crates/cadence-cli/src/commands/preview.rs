use anyhow::Result;
use cadence_core::repository::InMemoryRepository;
use cadence_core::service::SchedulingService;
use cadence_core::timezone::validate_timezone;
use chrono::{DateTime, Utc};

use crate::cli::PreviewCommand;
use crate::parser::parse_date;
use crate::util::resolve_task;
use crate::views::table::display_preview;

pub async fn preview_task(
    service: &SchedulingService<InMemoryRepository>,
    command: PreviewCommand,
    now: DateTime<Utc>,
) -> Result<()> {
    let task = resolve_task(service.repository(), &command.id).await?;
    let timezone = command
        .tz
        .unwrap_or_else(|| service.config().default_timezone.clone());
    validate_timezone(&timezone)?;
    let start_from = command.from.as_deref().map(|s| parse_date(s, now)).transpose()?;

    let entries = service
        .preview(task.id, start_from, Some(timezone.as_str()), now)
        .await?;
    display_preview(&task, &entries, &timezone);
    Ok(())
}
