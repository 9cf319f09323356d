use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::models::{RecurrenceType, Task, TaskPatch};
use crate::repository::TaskStore;

/// Counts from a batch of child removals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeletionSummary {
    pub deleted: usize,
    pub detached: usize,
    /// Children left in place because other rows still reference them
    pub skipped: usize,
}

/// Splits generated children into (future, past-or-overdue).
///
/// A child with no due date counts as future.
pub fn partition_children(children: Vec<Task>, now: DateTime<Utc>) -> (Vec<Task>, Vec<Task>) {
    children
        .into_iter()
        .partition(|child| child.due_date.map_or(true, |due| due > now))
}

/// TemplateRegenerator: keeps materialized children consistent with their template.
///
/// Responsibilities:
/// 1. Detect edits that invalidate already-generated future instances
/// 2. Purge those instances so later materialization reflects the new settings
/// 3. On template deletion, remove future instances and detach past ones
pub struct TemplateRegenerator<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: TaskStore + ?Sized> TemplateRegenerator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// True when `patch` touches a recurrence-shape field or a field copied
    /// onto instances (name, project, priority, note) of a recurring template.
    pub fn needs_regeneration(task: &Task, patch: &TaskPatch) -> bool {
        task.recurrence.is_recurring()
            && !task.is_generated_child()
            && (patch.changes_recurrence(task) || patch.changes_template_fields(task))
    }

    /// Deletes stale future children after a template edit.
    ///
    /// # Returns
    /// * `Ok(true)` - Future children were purged; the caller should
    ///   materialize a fresh set
    /// * `Ok(false)` - Nothing to regenerate, or the template stops recurring
    ///
    /// Past and overdue children are never touched here.
    pub async fn regenerate(
        &self,
        task: &Task,
        patch: &TaskPatch,
        now: DateTime<Utc>,
    ) -> Result<bool, CoreError> {
        if !Self::needs_regeneration(task, patch) {
            return Ok(false);
        }

        let new_type = patch
            .recurrence_type
            .unwrap_or(task.recurrence.recurrence_type);
        if new_type == RecurrenceType::None {
            tracing::debug!(template_id = %task.id, "recurrence removed; children left in place");
            return Ok(false);
        }

        let children = self.store.find_children_of(task.id).await?;
        let (future, past) = partition_children(children, now);

        let mut summary = DeletionSummary::default();
        for child in &future {
            self.delete_best_effort(child, &mut summary).await?;
        }

        tracing::debug!(
            template_id = %task.id,
            deleted = summary.deleted,
            skipped = summary.skipped,
            kept_past = past.len(),
            "regenerated template children"
        );
        Ok(true)
    }

    /// Removes or detaches every child of a template that is being deleted.
    ///
    /// Future children (no due date, or due after `now`) are deleted. Past
    /// and overdue ones become standalone, non-recurring tasks.
    pub async fn cascade_delete(
        &self,
        template: &Task,
        now: DateTime<Utc>,
    ) -> Result<DeletionSummary, CoreError> {
        let children = self.store.find_children_of(template.id).await?;
        let (future, past) = partition_children(children, now);

        let mut summary = DeletionSummary::default();
        for child in &future {
            self.delete_best_effort(child, &mut summary).await?;
        }

        let detach = TaskPatch::detach();
        for child in &past {
            self.store.apply_patch(child.id, &detach).await?;
            summary.detached += 1;
        }

        tracing::debug!(template_id = %template.id, ?summary, "template children cascaded");
        Ok(summary)
    }

    async fn delete_best_effort(
        &self,
        child: &Task,
        summary: &mut DeletionSummary,
    ) -> Result<(), CoreError> {
        match self.store.delete_task(child.id).await {
            Ok(()) => summary.deleted += 1,
            Err(CoreError::DependentRecords(reason)) => {
                tracing::warn!(
                    child_id = %child.id,
                    %reason,
                    "skipping child with dependent records"
                );
                summary.skipped += 1;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }
}
