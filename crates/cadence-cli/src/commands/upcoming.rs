use anyhow::Result;
use cadence_core::repository::InMemoryRepository;
use cadence_core::service::SchedulingService;
use chrono::{DateTime, Utc};

use crate::cli::UpcomingCommand;
use crate::views::table::display_upcoming;

pub async fn list_upcoming(
    service: &SchedulingService<InMemoryRepository>,
    command: UpcomingCommand,
    now: DateTime<Utc>,
) -> Result<()> {
    let filter = (!command.status.is_empty()).then_some(command.status.as_slice());
    let projected = service.upcoming(filter, now).await?;
    display_upcoming(&projected, now);
    Ok(())
}
