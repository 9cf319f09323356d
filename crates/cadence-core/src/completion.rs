use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::models::{Patch, RecurringCompletion, Task, TaskEvent, TaskPatch, TaskStatus};
use crate::recurrence::next_date;

pub const EVENT_RECURRENCE_ADVANCED: &str = "recurrence_advanced";
pub const EVENT_RECURRENCE_ENDED: &str = "recurrence_ended";

/// Decides whether a recurring task may roll forward to `next_due`.
pub trait GenerationPolicy: Send + Sync {
    fn should_generate_next(&self, task: &Task, next_due: DateTime<Utc>) -> bool;
}

/// Stops generation once the next date passes `recurrence_end_date`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndDatePolicy;

impl GenerationPolicy for EndDatePolicy {
    fn should_generate_next(&self, task: &Task, next_due: DateTime<Utc>) -> bool {
        task.recurrence.permits(next_due)
    }
}

/// Result of evaluating the advancement gate for one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Advancement {
    pub task_id: Uuid,
    /// Date the next occurrence was computed from.
    pub basis_date: DateTime<Utc>,
    pub previous_due_date: Option<DateTime<Utc>>,
    pub next_due_date: Option<DateTime<Utc>>,
    /// Whether the patch was rewritten to reopen the task.
    pub advanced: bool,
    pub completion: RecurringCompletion,
}

impl Advancement {
    /// Domain event describing the before/after due dates.
    pub fn event(&self) -> TaskEvent {
        let render = |date: Option<DateTime<Utc>>| {
            date.map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
        };
        TaskEvent {
            event_type: if self.advanced {
                EVENT_RECURRENCE_ADVANCED
            } else {
                EVENT_RECURRENCE_ENDED
            }
            .to_string(),
            task_id: self.task_id,
            old_value: render(self.previous_due_date),
            new_value: render(self.next_due_date.filter(|_| self.advanced)),
            metadata: json!({
                "basis_date": self.basis_date,
                "next_occurrence": self.next_due_date,
                "completion_id": self.completion.id,
            }),
            created_at: self.completion.completed_at,
        }
    }
}

/// CompletionAdvancer: rolls a recurring template forward when it is marked done.
///
/// Works purely on the in-memory patch; the caller persists the rewritten
/// patch in the same transaction as the status change.
#[derive(Debug, Clone, Default)]
pub struct CompletionAdvancer<P = EndDatePolicy> {
    policy: P,
}

impl CompletionAdvancer<EndDatePolicy> {
    pub fn new() -> Self {
        Self { policy: EndDatePolicy }
    }
}

impl<P: GenerationPolicy> CompletionAdvancer<P> {
    pub fn with_policy(policy: P) -> Self {
        Self { policy }
    }

    /// True when `patch` moves a template (not a generated child) into `done`.
    pub fn should_trigger(task: &Task, patch: &TaskPatch) -> bool {
        if patch.status != Some(TaskStatus::Done) || task.status == TaskStatus::Done {
            return false;
        }
        let resolved = patch.apply_to(task);
        resolved.recurrence.is_recurring()
            && !task.is_generated_child()
            && !resolved.is_generated_child()
    }

    /// Evaluates the advancement gate and rewrites `patch` accordingly.
    ///
    /// # Returns
    /// * `None` - The update does not complete a recurring template
    /// * `Some(Advancement)` - The gate was evaluated; `advanced` tells whether
    ///   the patch now reopens the task at `next_due_date`
    ///
    /// # Behavior
    /// - Basis date is `now` for completion-based recurrence, otherwise the
    ///   due date before this update (or `now` when there was none)
    /// - On advancement the patch resets status to `not_started`, clears
    ///   `completed_at` and sets the new due date
    /// - Otherwise the task stays done, with `completed_at` filled in if the
    ///   patch left it unset
    pub fn advance(
        &self,
        task: &Task,
        patch: &mut TaskPatch,
        now: DateTime<Utc>,
    ) -> Option<Advancement> {
        if !Self::should_trigger(task, patch) {
            return None;
        }

        let resolved = patch.apply_to(task);
        let basis_date = if resolved.recurrence.completion_based {
            now
        } else {
            task.due_date.unwrap_or(now)
        };
        let next_due_date = next_date(&resolved.recurrence, basis_date);
        let advanced =
            next_due_date.is_some_and(|next| self.policy.should_generate_next(&resolved, next));

        match next_due_date.filter(|_| advanced) {
            Some(next) => {
                patch.status = Some(TaskStatus::NotStarted);
                patch.completed_at = Patch::Null;
                patch.due_date = Patch::Value(next);
                tracing::debug!(task_id = %task.id, %basis_date, %next, "recurring task advanced");
            }
            None => {
                if patch.completed_at.is_unset() {
                    patch.completed_at = Patch::Value(now);
                }
                tracing::debug!(
                    task_id = %task.id,
                    %basis_date,
                    "recurrence ended; task stays done"
                );
            }
        }

        Some(Advancement {
            task_id: task.id,
            basis_date,
            previous_due_date: task.due_date,
            next_due_date,
            advanced,
            completion: RecurringCompletion::new(task.id, now, basis_date),
        })
    }
}
