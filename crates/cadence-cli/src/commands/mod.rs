use anyhow::{anyhow, Result};
use cadence_core::error::CoreError;
use cadence_core::models::{Patch, RecurrenceType, TaskPatch};
use chrono::{DateTime, Utc};

use crate::cli::RecurrenceArgs;
use crate::parser::{parse_date, parse_weekdays};

pub mod add;
pub mod complete;
pub mod delete;
pub mod edit;
pub mod list;
pub mod next;
pub mod preview;
pub mod upcoming;

/// Copies the recurrence flags onto `patch`.
///
/// A single `--weekday` sets `recurrence_weekday`; several set
/// `recurrence_weekdays`, and the other field is cleared either way.
pub(crate) fn apply_recurrence_args(
    args: &RecurrenceArgs,
    patch: &mut TaskPatch,
    now: DateTime<Utc>,
) -> Result<()> {
    if args.interval == Some(0) {
        return Err(anyhow!(CoreError::InvalidInput(
            "Interval must be at least 1".to_string()
        )));
    }
    if let Some(day) = args.month_day {
        if !(1..=31).contains(&day) {
            return Err(anyhow!(CoreError::InvalidInput(format!(
                "Day of month must be between 1 and 31, got {}",
                day
            ))));
        }
        patch.recurrence_month_day = Patch::Value(day);
    }

    let weekdays = parse_weekdays(&args.weekday)?;
    match weekdays.as_slice() {
        [] => {}
        [single] => {
            patch.recurrence_weekday = Patch::Value(*single);
            patch.recurrence_weekdays = Patch::Null;
        }
        _ => {
            patch.recurrence_weekday = Patch::Null;
            patch.recurrence_weekdays = Patch::Value(weekdays.clone());
        }
    }

    patch.recurrence_type = match (args.every, weekdays.is_empty()) {
        (Some(kind), _) => Some(kind),
        (None, false) => Some(RecurrenceType::Weekly),
        (None, true) => None,
    };
    patch.recurrence_interval = args.interval;

    if let Some(until) = &args.until {
        patch.recurrence_end_date = Patch::Value(parse_date(until, now)?);
    }
    Ok(())
}
