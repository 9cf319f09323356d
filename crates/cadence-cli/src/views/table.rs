use cadence_core::models::{
    PreviewEntry, ProjectedTask, RecurrenceConfig, RecurrenceType, Task, TaskPriority, TaskStatus,
};
use chrono::{DateTime, Utc};
use chrono_humanize::HumanTime;
use comfy_table::{Attribute, Cell, Color, Table};

use crate::util::short_id;

const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Due date with a relative hint, e.g. "2025-03-01 (in 3 days)".
pub fn format_due(due: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format!("{} ({})", due.format("%Y-%m-%d"), HumanTime::from(due - now))
}

/// Short human summary of a recurrence config, e.g. "every 2 weeks on Mon, Wed".
pub fn describe_recurrence(config: &RecurrenceConfig) -> String {
    let interval = config.interval();
    let mut text = match config.recurrence_type {
        RecurrenceType::None => return "-".to_string(),
        RecurrenceType::Daily if interval == 1 => "daily".to_string(),
        RecurrenceType::Daily => format!("every {} days", interval),
        RecurrenceType::Weekly if interval == 1 => "weekly".to_string(),
        RecurrenceType::Weekly => format!("every {} weeks", interval),
        RecurrenceType::Monthly if interval == 1 => "monthly".to_string(),
        RecurrenceType::Monthly => format!("every {} months", interval),
    };

    match config.recurrence_type {
        RecurrenceType::Weekly => {
            let days: Vec<u8> = match config.weekday_set() {
                Some(days) => days.to_vec(),
                None => config.recurrence_weekday.into_iter().collect(),
            };
            let names: Vec<&str> = days
                .iter()
                .filter_map(|d| WEEKDAY_NAMES.get(usize::from(*d)).copied())
                .collect();
            if !names.is_empty() {
                text.push_str(&format!(" on {}", names.join(", ")));
            }
        }
        RecurrenceType::Monthly => {
            if let Some(day) = config.recurrence_month_day {
                text.push_str(&format!(" on day {}", day));
            }
        }
        _ => {}
    }

    if let Some(end) = config.recurrence_end_date {
        text.push_str(&format!(" until {}", end.format("%Y-%m-%d")));
    }
    if config.completion_based {
        text.push_str(" (after completion)");
    }
    text
}

fn name_cell(name: &str, status: TaskStatus, priority: TaskPriority) -> Cell {
    let cell = Cell::new(name);
    match status {
        TaskStatus::Done | TaskStatus::Archived => cell
            .add_attribute(Attribute::CrossedOut)
            .fg(Color::DarkGrey),
        _ => match priority {
            TaskPriority::High => cell.fg(Color::Red).add_attribute(Attribute::Bold),
            TaskPriority::Medium => cell.fg(Color::Yellow),
            TaskPriority::Low => cell.fg(Color::Blue),
            TaskPriority::None => cell,
        },
    }
}

pub fn display_tasks(tasks: &[Task], now: DateTime<Utc>) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Status", "Due Date", "Recurrence"]);

    for task in tasks {
        let mut display_name = String::new();
        if task.is_template() {
            display_name.push_str("↻ ");
        }
        display_name.push_str(&task.name);
        if task.is_generated_child() {
            display_name.push_str(" (instance)");
        }

        table.add_row(vec![
            Cell::new(short_id(task)),
            name_cell(&display_name, task.status, task.priority),
            Cell::new(task.status.to_string()),
            Cell::new(task.due_date.map_or_else(|| "-".to_string(), |d| format_due(d, now))),
            Cell::new(describe_recurrence(&task.recurrence)),
        ]);
    }

    println!("{table}");
}

pub fn display_upcoming(projected: &[ProjectedTask], now: DateTime<Utc>) {
    if projected.is_empty() {
        println!("No upcoming occurrences.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Template", "#", "Name", "Due Date"]);

    for occurrence in projected {
        table.add_row(vec![
            Cell::new(short_id(&occurrence.task)),
            Cell::new(occurrence.occurrence_index),
            name_cell(&occurrence.task.name, TaskStatus::NotStarted, occurrence.task.priority),
            Cell::new(format_due(occurrence.due_date, now)),
        ]);
    }

    println!("{table}");
}

pub fn display_preview(task: &Task, entries: &[PreviewEntry], timezone: &str) {
    println!(
        "{}: {} [{}]",
        task.name,
        describe_recurrence(&task.recurrence),
        timezone
    );
    if entries.is_empty() {
        println!("No upcoming occurrences.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Local Date", "Local Time", "UTC"]);

    for (index, entry) in entries.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(entry.local_date.format("%Y-%m-%d")),
            Cell::new(&entry.local_display),
            Cell::new(entry.utc.format("%Y-%m-%dT%H:%M:%SZ")),
        ]);
    }

    println!("{table}");
}
