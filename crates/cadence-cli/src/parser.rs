use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use chrono_english::{parse_date_string, Dialect};

/// Parses an absolute or natural-language date ("tomorrow", "next friday",
/// "2025-03-01") relative to `now`.
pub fn parse_date(date_str: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    parse_date_string(date_str, now, Dialect::Us)
        .map_err(|e| anyhow!("Failed to parse date '{}': {}", date_str, e))
}

/// Parses a weekday name or number into 0 (Sunday) through 6 (Saturday).
pub fn parse_weekday(input: &str) -> Result<u8> {
    let lowered = input.trim().to_lowercase();
    let day = match lowered.as_str() {
        "sun" | "sunday" | "0" => 0,
        "mon" | "monday" | "1" => 1,
        "tue" | "tues" | "tuesday" | "2" => 2,
        "wed" | "wednesday" | "3" => 3,
        "thu" | "thur" | "thurs" | "thursday" | "4" => 4,
        "fri" | "friday" | "5" => 5,
        "sat" | "saturday" | "6" => 6,
        _ => return Err(anyhow!("Invalid weekday '{}'. Use mon..sun or 0-6", input)),
    };
    Ok(day)
}

/// Parses every entry of a repeated or comma-separated weekday flag.
pub fn parse_weekdays(inputs: &[String]) -> Result<Vec<u8>> {
    let mut days = Vec::new();
    for part in inputs.iter().flat_map(|s| s.split(',')) {
        if part.trim().is_empty() {
            continue;
        }
        let day = parse_weekday(part)?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    Ok(days)
}
