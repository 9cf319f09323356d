use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::models::{PreviewEntry, Task};
use crate::recurrence::{start_of_day, Occurrences, MAX_PREVIEW_OCCURRENCES};
use crate::timezone::{local_date, parse_timezone};

const DEFAULT_DISPLAY_FORMAT: &str = "%a %b %-d, %Y %H:%M %Z";

/// IterationPreviewer: read-only listing of a task's next few occurrence dates,
/// rendered in a caller-chosen timezone.
#[derive(Debug, Clone)]
pub struct IterationPreviewer {
    display_format: String,
}

impl Default for IterationPreviewer {
    fn default() -> Self {
        Self {
            display_format: DEFAULT_DISPLAY_FORMAT.to_string(),
        }
    }
}

impl IterationPreviewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// strftime pattern used for `PreviewEntry::local_display`.
    pub fn with_display_format(mut self, format: impl Into<String>) -> Self {
        self.display_format = format.into();
        self
    }

    /// Lists up to six upcoming occurrences of `task`.
    ///
    /// The search anchor is the UTC day of `start_from`, or of `now` when
    /// absent. The anchor day is included when it matches the pattern.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidTimezone` for an unknown zone name. A
    /// non-recurring task yields an empty list.
    pub fn preview(
        &self,
        task: &Task,
        start_from: Option<DateTime<Utc>>,
        timezone: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<PreviewEntry>, CoreError> {
        let tz = parse_timezone(timezone)?;
        if !task.recurrence.is_recurring() {
            return Ok(Vec::new());
        }

        let anchor = start_of_day(start_from.unwrap_or(now));
        let entries = Occurrences::from_anchor(&task.recurrence, anchor, MAX_PREVIEW_OCCURRENCES)
            .map(|utc| PreviewEntry {
                local_date: local_date(utc, tz),
                local_display: utc.with_timezone(&tz).format(&self.display_format).to_string(),
                utc,
            })
            .collect::<Vec<_>>();

        tracing::trace!(task_id = %task.id, %anchor, count = entries.len(), "built preview");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecurrenceConfig;
    use chrono::{NaiveDate, TimeZone};
    use rstest::rstest;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn task_with(recurrence: RecurrenceConfig) -> Task {
        Task {
            name: "Water plants".to_string(),
            recurrence,
            ..Default::default()
        }
    }

    fn dates(entries: &[PreviewEntry]) -> Vec<DateTime<Utc>> {
        entries.iter().map(|e| e.utc).collect()
    }

    #[test]
    fn test_daily_preview_includes_anchor_day() {
        let task = task_with(RecurrenceConfig::daily(1));
        let entries = IterationPreviewer::new()
            .preview(&task, Some(utc(2025, 1, 1)), "UTC", utc(2024, 6, 1))
            .unwrap();

        assert_eq!(entries.len(), MAX_PREVIEW_OCCURRENCES);
        assert_eq!(entries[0].utc, utc(2025, 1, 1));
        assert_eq!(entries[5].utc, utc(2025, 1, 6));
    }

    #[test]
    fn test_anchor_truncated_to_day() {
        let task = task_with(RecurrenceConfig::daily(2));
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 17, 45, 0).unwrap();
        let entries = IterationPreviewer::new()
            .preview(&task, Some(start), "UTC", start)
            .unwrap();
        assert_eq!(entries[0].utc, utc(2025, 1, 1));
        assert_eq!(entries[1].utc, utc(2025, 1, 3));
    }

    #[test]
    fn test_defaults_to_now() {
        let task = task_with(RecurrenceConfig::daily(1));
        let now = Utc.with_ymd_and_hms(2025, 4, 2, 9, 0, 0).unwrap();
        let entries = IterationPreviewer::new().preview(&task, None, "UTC", now).unwrap();
        assert_eq!(entries[0].utc, utc(2025, 4, 2));
    }

    #[test]
    fn test_weekly_skips_non_matching_anchor() {
        // 2025-01-01 is a Wednesday; Monday is 1.
        let task = task_with(RecurrenceConfig::weekly_on(1, 1));
        let entries = IterationPreviewer::new()
            .preview(&task, Some(utc(2025, 1, 1)), "UTC", utc(2025, 1, 1))
            .unwrap();
        assert_eq!(
            dates(&entries)[..3],
            [utc(2025, 1, 6), utc(2025, 1, 13), utc(2025, 1, 20)]
        );
    }

    #[test]
    fn test_monthly_31st_skips_short_months() {
        let task = task_with(RecurrenceConfig::monthly_on(Some(31)));
        let entries = IterationPreviewer::new()
            .preview(&task, Some(utc(2025, 1, 31)), "UTC", utc(2025, 1, 1))
            .unwrap();
        assert_eq!(
            dates(&entries),
            vec![
                utc(2025, 1, 31),
                utc(2025, 3, 31),
                utc(2025, 5, 31),
                utc(2025, 7, 31),
                utc(2025, 8, 31),
                utc(2025, 10, 31),
            ]
        );
    }

    #[test]
    fn test_stops_at_end_date() {
        let task = task_with(RecurrenceConfig::daily(1).until(utc(2025, 1, 3)));
        let entries = IterationPreviewer::new()
            .preview(&task, Some(utc(2025, 1, 1)), "UTC", utc(2025, 1, 1))
            .unwrap();
        assert_eq!(entries.len(), 3);
    }

    #[rstest]
    #[case("UTC", NaiveDate::from_ymd_opt(2025, 1, 6).unwrap())]
    #[case("America/New_York", NaiveDate::from_ymd_opt(2025, 1, 5).unwrap())]
    #[case("Asia/Tokyo", NaiveDate::from_ymd_opt(2025, 1, 6).unwrap())]
    fn test_local_date_follows_timezone(#[case] zone: &str, #[case] expected: NaiveDate) {
        let task = task_with(RecurrenceConfig::weekly_on(1, 1));
        let entries = IterationPreviewer::new()
            .preview(&task, Some(utc(2025, 1, 6)), zone, utc(2025, 1, 1))
            .unwrap();
        assert_eq!(entries[0].utc, utc(2025, 1, 6));
        assert_eq!(entries[0].local_date, expected);
    }

    #[test]
    fn test_custom_display_format() {
        let task = task_with(RecurrenceConfig::daily(1));
        let entries = IterationPreviewer::new()
            .with_display_format("%Y-%m-%d %H:%M")
            .preview(&task, Some(utc(2025, 1, 15)), "Europe/Berlin", utc(2025, 1, 1))
            .unwrap();
        assert_eq!(entries[0].local_display, "2025-01-15 01:00");
    }

    #[test]
    fn test_invalid_timezone() {
        let task = task_with(RecurrenceConfig::daily(1));
        let result =
            IterationPreviewer::new().preview(&task, None, "Mars/Olympus", utc(2025, 1, 1));
        assert!(matches!(result, Err(CoreError::InvalidTimezone(_))));
    }

    #[test]
    fn test_non_recurring_task_is_empty() {
        let task = task_with(RecurrenceConfig::default());
        let entries = IterationPreviewer::new()
            .preview(&task, None, "UTC", utc(2025, 1, 1))
            .unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_is_idempotent() {
        let task = task_with(RecurrenceConfig::weekly_on_days(vec![1, 3, 5]));
        let previewer = IterationPreviewer::new();
        let start = Some(utc(2025, 1, 1));
        let first = previewer.preview(&task, start, "UTC", utc(2025, 1, 1)).unwrap();
        let second = previewer.preview(&task, start, "UTC", utc(2025, 1, 1)).unwrap();
        assert_eq!(first, second);
    }
}
