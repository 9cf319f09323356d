//! Recurrence date arithmetic.
//!
//! Everything here works on UTC calendar days; timezone rendering is done by
//! [`crate::preview`] only. Degenerate configurations never error: they yield
//! `None` so callers can treat "no next occurrence" as a terminal state.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};

use crate::models::{RecurrenceConfig, RecurrenceType};

/// Entries produced by a single preview request.
pub const MAX_PREVIEW_OCCURRENCES: usize = 6;
/// Virtual occurrences projected per template.
pub const MAX_VIRTUAL_OCCURRENCES: usize = 6;
/// Steps allowed when rolling an overdue due date forward to the present.
pub const CATCH_UP_LIMIT: usize = 100;
/// Candidate months inspected before a monthly pattern gives up.
const MONTH_SCAN_LIMIT: u32 = 48;

/// Weekday of `date` numbered 0 (Sunday) through 6 (Saturday).
#[inline]
pub fn weekday_index(date: DateTime<Utc>) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Midnight UTC of the calendar day containing `date`.
#[inline]
pub fn start_of_day(date: DateTime<Utc>) -> DateTime<Utc> {
    date.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Computes the next occurrence strictly after `from`.
///
/// The time-of-day of `from` is carried over to the result.
///
/// # Behavior
/// - daily: `from + interval` days
/// - weekly (single weekday): next matching weekday; a same-weekday `from`
///   advances a full `interval` weeks
/// - weekly (weekday set): first day of the following seven whose weekday is
///   in the set, falling back to `from + 7` days
/// - monthly: next month carrying the target day-of-month; months too short
///   for the target are skipped, never clamped
pub fn next_date(config: &RecurrenceConfig, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match config.recurrence_type {
        RecurrenceType::None => None,
        RecurrenceType::Daily => {
            from.checked_add_signed(Duration::days(i64::from(config.interval())))
        }
        RecurrenceType::Weekly => next_weekly(config, from),
        RecurrenceType::Monthly => next_monthly(config, from),
    }
}

fn next_weekly(config: &RecurrenceConfig, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if let Some(days) = config.weekday_set() {
        return (1..=7)
            .filter_map(|offset| from.checked_add_signed(Duration::days(offset)))
            .find(|candidate| days.contains(&weekday_index(*candidate)))
            .or_else(|| from.checked_add_signed(Duration::days(7)));
    }

    let target = config.recurrence_weekday.filter(|day| *day <= 6)?;
    let current = weekday_index(from);
    let offset = if current == target {
        7 * i64::from(config.interval())
    } else {
        i64::from((target + 7 - current) % 7)
    };
    from.checked_add_signed(Duration::days(offset))
}

fn target_month_day(config: &RecurrenceConfig, reference: DateTime<Utc>) -> Option<u32> {
    match config.recurrence_month_day {
        Some(day) if (1..=31).contains(&day) => Some(u32::from(day)),
        Some(_) => None,
        None => Some(reference.day()),
    }
}

fn next_monthly(config: &RecurrenceConfig, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let target = target_month_day(config, from)?;
    let step = Months::new(config.interval());
    let this_month = NaiveDate::from_ymd_opt(from.year(), from.month(), 1)?;

    let mut month = if target > from.day() {
        this_month
    } else {
        this_month.checked_add_months(step)?
    };

    for _ in 0..MONTH_SCAN_LIMIT {
        if let Some(date) = month.with_day(target) {
            return Some(date.and_time(from.time()).and_utc());
        }
        month = month.checked_add_months(step)?;
    }
    None
}

/// Returns the occurrence falling on `reference`'s calendar day, if the
/// pattern includes that day.
///
/// For monthly patterns the matched date is synthesized from the target
/// day-of-month, so matching and date construction are the same step.
pub fn match_day(config: &RecurrenceConfig, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match config.recurrence_type {
        RecurrenceType::None => None,
        RecurrenceType::Daily => Some(reference),
        RecurrenceType::Weekly => {
            let weekday = weekday_index(reference);
            let matches = match config.weekday_set() {
                Some(days) => days.contains(&weekday),
                None => config.recurrence_weekday == Some(weekday),
            };
            matches.then_some(reference)
        }
        RecurrenceType::Monthly => {
            let target = target_month_day(config, reference)?;
            if target != reference.day() {
                return None;
            }
            reference
                .date_naive()
                .with_day(target)
                .map(|date| date.and_time(reference.time()).and_utc())
        }
    }
}

#[inline]
pub fn matches_day(config: &RecurrenceConfig, reference: DateTime<Utc>) -> bool {
    match_day(config, reference).is_some()
}

/// Rolls an overdue date forward until it is on or after `floor`.
///
/// Gives up (returns `None`) after [`CATCH_UP_LIMIT`] steps or when the
/// pattern stops advancing.
pub fn catch_up(
    config: &RecurrenceConfig,
    from: DateTime<Utc>,
    floor: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let mut current = from;
    for _ in 0..CATCH_UP_LIMIT {
        if current >= floor {
            return Some(current);
        }
        current = next_date(config, current)?;
    }
    if current >= floor {
        Some(current)
    } else {
        tracing::trace!(%from, %floor, "catch-up limit reached");
        None
    }
}

/// Bounded sequence of occurrence dates.
///
/// Stops at the configured limit, when the end date is exceeded, or when the
/// pattern can no longer advance.
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    config: &'a RecurrenceConfig,
    next: Option<DateTime<Utc>>,
    remaining: usize,
}

impl<'a> Occurrences<'a> {
    /// Sequence whose first element is `first` itself.
    pub fn starting_at(
        config: &'a RecurrenceConfig,
        first: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Self {
        Self {
            config,
            next: first,
            remaining: limit,
        }
    }

    /// Sequence beginning with `anchor` when the anchor day matches the
    /// pattern, otherwise with the first occurrence after it.
    pub fn from_anchor(config: &'a RecurrenceConfig, anchor: DateTime<Utc>, limit: usize) -> Self {
        let first = match_day(config, anchor).or_else(|| next_date(config, anchor));
        Self::starting_at(config, first, limit)
    }
}

impl Iterator for Occurrences<'_> {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next.take().filter(|date| self.config.permits(*date))?;
        self.remaining -= 1;
        self.next = next_date(self.config, current).filter(|next| *next > current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rstest::rstest;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    mod calculator_tests {
        use super::*;

        #[rstest]
        #[case(1, utc(2025, 1, 1), utc(2025, 1, 2))]
        #[case(2, utc(2025, 1, 1), utc(2025, 1, 3))]
        #[case(7, utc(2025, 2, 25), utc(2025, 3, 4))]
        fn test_daily(
            #[case] interval: u32,
            #[case] from: DateTime<Utc>,
            #[case] expected: DateTime<Utc>,
        ) {
            assert_eq!(next_date(&RecurrenceConfig::daily(interval), from), Some(expected));
        }

        #[test]
        fn test_daily_preserves_time_of_day() {
            let from = Utc.with_ymd_and_hms(2025, 3, 9, 14, 30, 0).unwrap();
            let next = next_date(&RecurrenceConfig::daily(1), from).unwrap();
            assert_eq!(next, Utc.with_ymd_and_hms(2025, 3, 10, 14, 30, 0).unwrap());
        }

        // 2025-01-01 is a Wednesday (3).
        #[rstest]
        #[case(5, 1, utc(2025, 1, 3))]
        #[case(1, 1, utc(2025, 1, 6))]
        #[case(3, 1, utc(2025, 1, 8))]
        #[case(3, 2, utc(2025, 1, 15))]
        #[case(0, 1, utc(2025, 1, 5))]
        fn test_weekly_single_day(
            #[case] weekday: u8,
            #[case] interval: u32,
            #[case] expected: DateTime<Utc>,
        ) {
            let config = RecurrenceConfig::weekly_on(weekday, interval);
            assert_eq!(next_date(&config, utc(2025, 1, 1)), Some(expected));
        }

        #[test]
        fn test_weekly_day_set_from_wednesday() {
            let config = RecurrenceConfig::weekly_on_days(vec![1, 3, 5]);
            assert_eq!(next_date(&config, utc(2025, 1, 1)), Some(utc(2025, 1, 3)));
            assert_eq!(next_date(&config, utc(2025, 1, 3)), Some(utc(2025, 1, 6)));
        }

        #[test]
        fn test_weekly_day_set_takes_precedence() {
            let mut config = RecurrenceConfig::weekly_on_days(vec![6]);
            config.recurrence_weekday = Some(1);
            assert_eq!(next_date(&config, utc(2025, 1, 1)), Some(utc(2025, 1, 4)));
        }

        #[test]
        fn test_weekly_without_weekday_does_not_advance() {
            let config = RecurrenceConfig {
                recurrence_type: RecurrenceType::Weekly,
                recurrence_weekdays: Some(vec![]),
                ..Default::default()
            };
            assert_eq!(next_date(&config, utc(2025, 1, 1)), None);
        }

        #[test]
        fn test_weekly_set_with_only_invalid_days_falls_back_a_week() {
            let config = RecurrenceConfig::weekly_on_days(vec![9]);
            assert_eq!(next_date(&config, utc(2025, 1, 1)), Some(utc(2025, 1, 8)));
        }

        #[test]
        fn test_monthly_skips_short_months() {
            let config = RecurrenceConfig::monthly_on(Some(31));
            assert_eq!(next_date(&config, utc(2025, 1, 31)), Some(utc(2025, 3, 31)));
            assert_eq!(next_date(&config, utc(2025, 2, 10)), Some(utc(2025, 3, 31)));
            assert_eq!(next_date(&config, utc(2025, 3, 1)), Some(utc(2025, 3, 31)));
        }

        #[test]
        fn test_monthly_defaults_to_reference_day() {
            let config = RecurrenceConfig::monthly_on(None);
            let from = Utc.with_ymd_and_hms(2025, 4, 15, 8, 0, 0).unwrap();
            assert_eq!(
                next_date(&config, from),
                Some(Utc.with_ymd_and_hms(2025, 5, 15, 8, 0, 0).unwrap())
            );
        }

        #[test]
        fn test_monthly_later_day_in_same_month() {
            let config = RecurrenceConfig::monthly_on(Some(20));
            assert_eq!(next_date(&config, utc(2025, 4, 15)), Some(utc(2025, 4, 20)));
        }

        #[test]
        fn test_monthly_interval_steps_months() {
            let mut config = RecurrenceConfig::monthly_on(Some(5));
            config.recurrence_interval = 3;
            assert_eq!(next_date(&config, utc(2025, 1, 5)), Some(utc(2025, 4, 5)));
        }

        #[rstest]
        #[case(Some(0))]
        #[case(Some(32))]
        fn test_monthly_malformed_day(#[case] day: Option<u8>) {
            let config = RecurrenceConfig::monthly_on(day);
            assert_eq!(next_date(&config, utc(2025, 1, 1)), None);
        }

        #[test]
        fn test_none_type() {
            assert_eq!(next_date(&RecurrenceConfig::default(), utc(2025, 1, 1)), None);
        }
    }

    mod matcher_tests {
        use super::*;

        #[test]
        fn test_daily_always_matches() {
            assert!(matches_day(&RecurrenceConfig::daily(3), utc(2025, 7, 19)));
        }

        #[test]
        fn test_weekly_day_set_matches_wednesday() {
            let config = RecurrenceConfig::weekly_on_days(vec![1, 3, 5]);
            assert!(matches_day(&config, utc(2025, 1, 1)));
            assert!(!matches_day(&config, utc(2025, 1, 2)));
        }

        #[test]
        fn test_weekly_single_day() {
            let config = RecurrenceConfig::weekly_on(4, 1);
            assert!(matches_day(&config, utc(2025, 1, 2)));
            assert!(!matches_day(&config, utc(2025, 1, 1)));
        }

        #[test]
        fn test_weekly_without_weekday_never_matches() {
            let config = RecurrenceConfig {
                recurrence_type: RecurrenceType::Weekly,
                ..Default::default()
            };
            assert!(!matches_day(&config, utc(2025, 1, 1)));
        }

        #[test]
        fn test_monthly_returns_synthesized_date() {
            let config = RecurrenceConfig::monthly_on(Some(31));
            let reference = Utc.with_ymd_and_hms(2025, 3, 31, 6, 0, 0).unwrap();
            assert_eq!(match_day(&config, reference), Some(reference));
            assert_eq!(match_day(&config, utc(2025, 3, 30)), None);
            assert_eq!(match_day(&config, utc(2025, 2, 28)), None);
        }
    }

    mod occurrences_tests {
        use super::*;

        #[test]
        fn test_limit_is_respected() {
            let config = RecurrenceConfig::daily(1);
            let dates: Vec<_> = Occurrences::from_anchor(&config, utc(2025, 1, 1), 6).collect();
            assert_eq!(dates.len(), 6);
            assert_eq!(dates[0], utc(2025, 1, 1));
            assert_eq!(dates[5], utc(2025, 1, 6));
        }

        #[test]
        fn test_end_date_is_inclusive_bound() {
            let config = RecurrenceConfig::daily(1).until(utc(2025, 1, 3));
            let dates: Vec<_> = Occurrences::from_anchor(&config, utc(2025, 1, 1), 6).collect();
            assert_eq!(dates, vec![utc(2025, 1, 1), utc(2025, 1, 2), utc(2025, 1, 3)]);
        }

        #[test]
        fn test_non_matching_anchor_starts_at_next() {
            let config = RecurrenceConfig::weekly_on(1, 1);
            let first = Occurrences::from_anchor(&config, utc(2025, 1, 1), 6).next();
            assert_eq!(first, Some(utc(2025, 1, 6)));
        }

        #[test]
        fn test_degenerate_pattern_is_empty() {
            let config = RecurrenceConfig {
                recurrence_type: RecurrenceType::Weekly,
                ..Default::default()
            };
            assert_eq!(Occurrences::from_anchor(&config, utc(2025, 1, 1), 6).count(), 0);
        }

        #[test]
        fn test_catch_up_reaches_floor() {
            let config = RecurrenceConfig::daily(2);
            assert_eq!(
                catch_up(&config, utc(2025, 1, 1), utc(2025, 1, 10)),
                Some(utc(2025, 1, 11))
            );
        }

        #[test]
        fn test_catch_up_gives_up_after_limit() {
            let config = RecurrenceConfig::daily(1);
            assert_eq!(catch_up(&config, utc(2000, 1, 1), utc(2025, 1, 1)), None);
        }
    }

    proptest! {
        #[test]
        fn prop_daily_adds_interval(days in 0i64..20_000, interval in 1u32..60) {
            let from = utc(2000, 1, 1) + Duration::days(days);
            let next = next_date(&RecurrenceConfig::daily(interval), from);
            prop_assert_eq!(next, Some(from + Duration::days(i64::from(interval))));
        }

        #[test]
        fn prop_weekly_single_day_lands_on_weekday(
            days in 0i64..20_000,
            weekday in 0u8..7,
            interval in 1u32..5,
        ) {
            let from = utc(2000, 1, 1) + Duration::days(days);
            let next = next_date(&RecurrenceConfig::weekly_on(weekday, interval), from).unwrap();
            prop_assert_eq!(weekday_index(next), weekday);
            prop_assert!(next > from);
        }

        #[test]
        fn prop_weekly_set_within_a_week(
            days in 0i64..20_000,
            set in proptest::collection::vec(0u8..7, 1..7),
        ) {
            let from = utc(2000, 1, 1) + Duration::days(days);
            let next = next_date(&RecurrenceConfig::weekly_on_days(set.clone()), from).unwrap();
            prop_assert!(next > from);
            prop_assert!(next <= from + Duration::days(7));
            prop_assert!(set.contains(&weekday_index(next)));
        }
    }
}
