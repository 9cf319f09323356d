use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Waiting,
    Done,
    Archived,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task status: {0}")]
pub struct ParseTaskStatusError(String);

impl FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "not_started" | "todo" => Ok(TaskStatus::NotStarted),
            "in_progress" => Ok(TaskStatus::InProgress),
            "waiting" => Ok(TaskStatus::Waiting),
            "done" | "completed" => Ok(TaskStatus::Done),
            "archived" => Ok(TaskStatus::Archived),
            _ => Err(ParseTaskStatusError(s.to_string())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::NotStarted => write!(f, "not_started"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Waiting => write!(f, "waiting"),
            TaskStatus::Done => write!(f, "done"),
            TaskStatus::Archived => write!(f, "archived"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task priority: {0}")]
pub struct ParseTaskPriorityError(String);

impl FromStr for TaskPriority {
    type Err = ParseTaskPriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(TaskPriority::None),
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(ParseTaskPriorityError(s.to_string())),
        }
    }
}

// ============================================================================
// Recurrence Configuration
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid recurrence type: {0}")]
pub struct ParseRecurrenceTypeError(String);

impl FromStr for RecurrenceType {
    type Err = ParseRecurrenceTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(RecurrenceType::None),
            "daily" => Ok(RecurrenceType::Daily),
            "weekly" => Ok(RecurrenceType::Weekly),
            "monthly" => Ok(RecurrenceType::Monthly),
            _ => Err(ParseRecurrenceTypeError(s.to_string())),
        }
    }
}

impl fmt::Display for RecurrenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrenceType::None => write!(f, "none"),
            RecurrenceType::Daily => write!(f, "daily"),
            RecurrenceType::Weekly => write!(f, "weekly"),
            RecurrenceType::Monthly => write!(f, "monthly"),
        }
    }
}

fn default_interval() -> u32 {
    1
}

/// Recurrence settings embedded in a task record.
///
/// Weekdays are numbered 0 (Sunday) through 6 (Saturday). Only meaningful on a
/// template: generated children carry the default (non-recurring) config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecurrenceConfig {
    #[serde(default)]
    pub recurrence_type: RecurrenceType,
    /// Days for daily, weeks for weekly, months for monthly. Zero is read as 1.
    #[serde(default = "default_interval")]
    pub recurrence_interval: u32,
    /// Inclusive last permitted occurrence; nothing is generated after it.
    #[serde(default)]
    pub recurrence_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub recurrence_weekday: Option<u8>,
    /// Takes precedence over `recurrence_weekday` when non-empty.
    #[serde(default)]
    pub recurrence_weekdays: Option<Vec<u8>>,
    /// Defaults to the reference date's day-of-month when absent.
    #[serde(default)]
    pub recurrence_month_day: Option<u8>,
    #[serde(default)]
    pub completion_based: bool,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            recurrence_type: RecurrenceType::None,
            recurrence_interval: default_interval(),
            recurrence_end_date: None,
            recurrence_weekday: None,
            recurrence_weekdays: None,
            recurrence_month_day: None,
            completion_based: false,
        }
    }
}

impl RecurrenceConfig {
    pub fn daily(interval: u32) -> Self {
        Self {
            recurrence_type: RecurrenceType::Daily,
            recurrence_interval: interval,
            ..Default::default()
        }
    }

    pub fn weekly_on(weekday: u8, interval: u32) -> Self {
        Self {
            recurrence_type: RecurrenceType::Weekly,
            recurrence_interval: interval,
            recurrence_weekday: Some(weekday),
            ..Default::default()
        }
    }

    pub fn weekly_on_days(weekdays: impl Into<Vec<u8>>) -> Self {
        Self {
            recurrence_type: RecurrenceType::Weekly,
            recurrence_weekdays: Some(weekdays.into()),
            ..Default::default()
        }
    }

    pub fn monthly_on(month_day: Option<u8>) -> Self {
        Self {
            recurrence_type: RecurrenceType::Monthly,
            recurrence_month_day: month_day,
            ..Default::default()
        }
    }

    pub fn until(mut self, end: DateTime<Utc>) -> Self {
        self.recurrence_end_date = Some(end);
        self
    }

    pub fn completion_based(mut self) -> Self {
        self.completion_based = true;
        self
    }

    #[inline]
    pub fn is_recurring(&self) -> bool {
        self.recurrence_type != RecurrenceType::None
    }

    #[inline]
    pub fn interval(&self) -> u32 {
        self.recurrence_interval.max(1)
    }

    /// The multi-day weekly pattern, if one is configured and non-empty.
    pub fn weekday_set(&self) -> Option<&[u8]> {
        self.recurrence_weekdays
            .as_deref()
            .filter(|days| !days.is_empty())
    }

    /// Returns false when `date` lies past the configured end date.
    #[inline]
    pub fn permits(&self, date: DateTime<Utc>) -> bool {
        self.recurrence_end_date.map_or(true, |end| date <= end)
    }
}

// ============================================================================
// Tasks
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub project_id: Option<Uuid>,
    /// Subtask parent. Distinct from `recurring_parent_id`.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    /// Template that generated this instance. None on templates and plain tasks.
    #[serde(default)]
    pub recurring_parent_id: Option<Uuid>,
    #[serde(flatten)]
    pub recurrence: RecurrenceConfig,
}

impl Default for Task {
    fn default() -> Self {
        Self {
            id: Uuid::now_v7(),
            name: "".to_string(),
            description: None,
            note: None,
            project_id: None,
            parent_id: None,
            status: TaskStatus::NotStarted,
            priority: TaskPriority::None,
            due_date: None,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            recurring_parent_id: None,
            recurrence: RecurrenceConfig::default(),
        }
    }
}

impl Task {
    /// A template recurs and was not itself generated from another template.
    #[inline]
    pub fn is_template(&self) -> bool {
        self.recurring_parent_id.is_none() && self.recurrence.is_recurring()
    }

    #[inline]
    pub fn is_generated_child(&self) -> bool {
        self.recurring_parent_id.is_some()
    }
}

/// Append-only record written once per advanced occurrence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecurringCompletion {
    pub id: Uuid,
    pub task_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub original_due_date: DateTime<Utc>,
    pub skipped: bool,
}

impl RecurringCompletion {
    pub fn new(
        task_id: Uuid,
        completed_at: DateTime<Utc>,
        original_due_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            task_id,
            completed_at,
            original_due_date,
            skipped: false,
        }
    }
}

/// Domain event handed to the event log collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskEvent {
    pub event_type: String,
    pub task_id: Uuid,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Patches
// ============================================================================

/// Tri-state field update: leave alone, clear, or set.
///
/// Deserializes an absent key as `Unset` (with `#[serde(default)]`) and an
/// explicit `null` as `Null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Unset,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unset
    }
}

impl<T> Patch<T> {
    #[inline]
    pub fn is_unset(&self) -> bool {
        matches!(self, Patch::Unset)
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: Clone + PartialEq> Patch<T> {
    /// Final value after applying this patch over `current`.
    pub fn resolve(&self, current: Option<&T>) -> Option<T> {
        match self {
            Patch::Unset => current.cloned(),
            Patch::Null => None,
            Patch::Value(v) => Some(v.clone()),
        }
    }

    pub fn differs_from(&self, current: Option<&T>) -> bool {
        match self {
            Patch::Unset => false,
            Patch::Null => current.is_some(),
            Patch::Value(v) => current != Some(v),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Patch::Null, Patch::Value)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Value(v) => v.serialize(serializer),
            Patch::Unset | Patch::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

fn option_differs<T: PartialEq>(proposed: &Option<T>, current: &T) -> bool {
    proposed.as_ref().is_some_and(|v| v != current)
}

/// Proposed attribute changes for a task.
///
/// Non-nullable columns use `Option`; nullable ones use [`Patch`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub description: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub note: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub project_id: Patch<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub due_date: Patch<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub completed_at: Patch<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub recurring_parent_id: Patch<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_type: Option<RecurrenceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub recurrence_end_date: Patch<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub recurrence_weekday: Patch<u8>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub recurrence_weekdays: Patch<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub recurrence_month_day: Patch<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_based: Option<bool>,
}

impl TaskPatch {
    /// Patch that turns a generated child into a standalone, non-recurring task.
    pub fn detach() -> Self {
        Self {
            recurring_parent_id: Patch::Null,
            recurrence_type: Some(RecurrenceType::None),
            recurrence_interval: Some(default_interval()),
            recurrence_end_date: Patch::Null,
            recurrence_weekday: Patch::Null,
            recurrence_weekdays: Patch::Null,
            recurrence_month_day: Patch::Null,
            completion_based: Some(false),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Resolves the patch against `task`, returning the task as it would be
    /// stored. `updated_at` is left for the store to maintain.
    pub fn apply_to(&self, task: &Task) -> Task {
        let current = &task.recurrence;
        Task {
            id: task.id,
            name: self.name.clone().unwrap_or_else(|| task.name.clone()),
            description: self.description.resolve(task.description.as_ref()),
            note: self.note.resolve(task.note.as_ref()),
            project_id: self.project_id.resolve(task.project_id.as_ref()),
            parent_id: task.parent_id,
            status: self.status.unwrap_or(task.status),
            priority: self.priority.unwrap_or(task.priority),
            due_date: self.due_date.resolve(task.due_date.as_ref()),
            completed_at: self.completed_at.resolve(task.completed_at.as_ref()),
            created_at: task.created_at,
            updated_at: task.updated_at,
            recurring_parent_id: self
                .recurring_parent_id
                .resolve(task.recurring_parent_id.as_ref()),
            recurrence: RecurrenceConfig {
                recurrence_type: self.recurrence_type.unwrap_or(current.recurrence_type),
                recurrence_interval: self
                    .recurrence_interval
                    .unwrap_or(current.recurrence_interval),
                recurrence_end_date: self
                    .recurrence_end_date
                    .resolve(current.recurrence_end_date.as_ref()),
                recurrence_weekday: self
                    .recurrence_weekday
                    .resolve(current.recurrence_weekday.as_ref()),
                recurrence_weekdays: self
                    .recurrence_weekdays
                    .resolve(current.recurrence_weekdays.as_ref()),
                recurrence_month_day: self
                    .recurrence_month_day
                    .resolve(current.recurrence_month_day.as_ref()),
                completion_based: self.completion_based.unwrap_or(current.completion_based),
            },
        }
    }

    /// True when any recurrence-shape field would change on `task`.
    pub fn changes_recurrence(&self, task: &Task) -> bool {
        let current = &task.recurrence;
        option_differs(&self.recurrence_type, &current.recurrence_type)
            || option_differs(&self.recurrence_interval, &current.recurrence_interval)
            || self
                .recurrence_end_date
                .differs_from(current.recurrence_end_date.as_ref())
            || self
                .recurrence_weekday
                .differs_from(current.recurrence_weekday.as_ref())
            || self
                .recurrence_weekdays
                .differs_from(current.recurrence_weekdays.as_ref())
            || self
                .recurrence_month_day
                .differs_from(current.recurrence_month_day.as_ref())
            || option_differs(&self.completion_based, &current.completion_based)
    }

    /// True when a field copied onto generated instances would change.
    pub fn changes_template_fields(&self, task: &Task) -> bool {
        option_differs(&self.name, &task.name)
            || self.project_id.differs_from(task.project_id.as_ref())
            || option_differs(&self.priority, &task.priority)
            || self.note.differs_from(task.note.as_ref())
    }
}

// ============================================================================
// Engine Outputs
// ============================================================================

/// A computed, never-persisted future occurrence of a template.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProjectedTask {
    /// `<template-id>_occurrence_<index>`
    pub id: String,
    pub template_id: Uuid,
    pub occurrence_index: usize,
    pub is_virtual_occurrence: bool,
    pub due_date: DateTime<Utc>,
    /// Template fields with `due_date` overwritten.
    pub task: Task,
}

impl ProjectedTask {
    pub fn virtual_id(template_id: Uuid, index: usize) -> String {
        format!("{}_occurrence_{}", template_id, index)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PreviewEntry {
    pub local_date: NaiveDate,
    pub local_display: String,
    pub utc: DateTime<Utc>,
}

/// Scheduling defaults supplied by the embedding application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Horizon for virtual occurrence expansion
    pub window_days: u32,
    /// IANA zone used for previews when the caller does not name one
    pub default_timezone: String,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            window_days: 30,
            default_timezone: "UTC".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn template() -> Task {
        Task {
            name: "Water plants".to_string(),
            due_date: Some(Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()),
            recurrence: RecurrenceConfig::daily(2),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("done".parse::<TaskStatus>(), Ok(TaskStatus::Done));
        assert_eq!("not-started".parse::<TaskStatus>(), Ok(TaskStatus::NotStarted));
        assert!("finished".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_template_detection() {
        let mut task = template();
        assert!(task.is_template());

        task.recurring_parent_id = Some(Uuid::now_v7());
        assert!(!task.is_template());
        assert!(task.is_generated_child());

        let plain = Task::default();
        assert!(!plain.is_template());
    }

    #[test]
    fn test_zero_interval_reads_as_one() {
        let config = RecurrenceConfig::daily(0);
        assert_eq!(config.interval(), 1);
    }

    #[test]
    fn test_patch_resolve_tri_state() {
        let current = Some(5u8);
        assert_eq!(Patch::Unset.resolve(current.as_ref()), Some(5));
        assert_eq!(Patch::<u8>::Null.resolve(current.as_ref()), None);
        assert_eq!(Patch::Value(7).resolve(current.as_ref()), Some(7));
    }

    #[test]
    fn test_patch_deserialize_distinguishes_missing_and_null() {
        let patch: TaskPatch = serde_json::from_str(r#"{"note": null}"#).unwrap();
        assert_eq!(patch.note, Patch::Null);
        assert_eq!(patch.due_date, Patch::Unset);

        let patch: TaskPatch = serde_json::from_str(r#"{"recurrence_weekday": 3}"#).unwrap();
        assert_eq!(patch.recurrence_weekday, Patch::Value(3));
    }

    #[test]
    fn test_apply_to_keeps_unset_fields() {
        let task = template();
        let patch = TaskPatch {
            name: Some("Water garden".to_string()),
            recurrence_end_date: Patch::Value(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };

        let resolved = patch.apply_to(&task);
        assert_eq!(resolved.name, "Water garden");
        assert_eq!(resolved.due_date, task.due_date);
        assert_eq!(resolved.recurrence.recurrence_interval, 2);
        assert!(resolved.recurrence.recurrence_end_date.is_some());
    }

    #[test]
    fn test_change_detection() {
        let task = template();

        let same_interval = TaskPatch {
            recurrence_interval: Some(2),
            ..Default::default()
        };
        assert!(!same_interval.changes_recurrence(&task));

        let new_interval = TaskPatch {
            recurrence_interval: Some(3),
            ..Default::default()
        };
        assert!(new_interval.changes_recurrence(&task));

        let description_only = TaskPatch {
            description: Patch::Value("details".to_string()),
            ..Default::default()
        };
        assert!(!description_only.changes_recurrence(&task));
        assert!(!description_only.changes_template_fields(&task));

        let note = TaskPatch {
            note: Patch::Value("bring the blue can".to_string()),
            ..Default::default()
        };
        assert!(note.changes_template_fields(&task));
    }

    #[test]
    fn test_detach_clears_recurrence() {
        let mut child = template();
        child.recurring_parent_id = Some(Uuid::now_v7());
        child.recurrence.completion_based = true;

        let detached = TaskPatch::detach().apply_to(&child);
        assert!(detached.recurring_parent_id.is_none());
        assert_eq!(detached.recurrence, RecurrenceConfig::default());
        assert_eq!(detached.due_date, child.due_date);
    }

    #[test]
    fn test_virtual_id_format() {
        let id = Uuid::nil();
        assert_eq!(
            ProjectedTask::virtual_id(id, 2),
            "00000000-0000-0000-0000-000000000000_occurrence_2"
        );
    }
}
