use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::completion::{Advancement, CompletionAdvancer, EndDatePolicy, GenerationPolicy};
use crate::error::CoreError;
use crate::expansion::VirtualOccurrenceExpander;
use crate::models::{PreviewEntry, ProjectedTask, SchedulingConfig, Task, TaskPatch, TaskStatus};
use crate::preview::IterationPreviewer;
use crate::regeneration::{DeletionSummary, TemplateRegenerator};
use crate::repository::Repository;

/// Outcome of [`SchedulingService::update_task`].
#[derive(Debug, Clone)]
pub struct TaskUpdate {
    /// Task as persisted after the patch.
    pub task: Task,
    /// Present when the update completed a recurring template.
    pub advancement: Option<Advancement>,
    /// Whether stale future children were purged.
    pub regenerated: bool,
}

/// Wires the scheduling components to a [`Repository`].
///
/// The pure components compute; this type performs the collaborator calls
/// around them in the order the store needs: child deletions before the
/// template patch, completion and event logging after it.
pub struct SchedulingService<R, P = EndDatePolicy> {
    repo: R,
    config: SchedulingConfig,
    expander: VirtualOccurrenceExpander,
    advancer: CompletionAdvancer<P>,
    previewer: IterationPreviewer,
}

impl<R: Repository> SchedulingService<R> {
    pub fn new(repo: R, config: SchedulingConfig) -> Self {
        Self::with_policy(repo, config, EndDatePolicy)
    }
}

impl<R: Repository, P: GenerationPolicy> SchedulingService<R, P> {
    pub fn with_policy(repo: R, config: SchedulingConfig, policy: P) -> Self {
        Self {
            expander: VirtualOccurrenceExpander::from_config(&config),
            advancer: CompletionAdvancer::with_policy(policy),
            previewer: IterationPreviewer::new(),
            repo,
            config,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    /// Applies `patch` to task `id`, running regeneration and completion
    /// advancement as the patch requires.
    pub async fn update_task(
        &self,
        id: Uuid,
        mut patch: TaskPatch,
        now: DateTime<Utc>,
    ) -> Result<TaskUpdate, CoreError> {
        let task = self
            .repo
            .get_task(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        let regenerated = TemplateRegenerator::new(&self.repo)
            .regenerate(&task, &patch, now)
            .await?;
        let advancement = self.advancer.advance(&task, &mut patch, now);

        let updated = self.repo.apply_patch(id, &patch).await?;
        if let Some(advancement) = &advancement {
            self.log_completion(advancement).await;
        }

        Ok(TaskUpdate {
            task: updated,
            advancement,
            regenerated,
        })
    }

    /// Marks a task done. Recurring templates roll forward to their next date.
    pub async fn complete_task(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<TaskUpdate, CoreError> {
        let patch = TaskPatch {
            status: Some(TaskStatus::Done),
            ..Default::default()
        };
        self.update_task(id, patch, now).await
    }

    /// Deletes a task. For templates, future children go first and past ones
    /// are detached so their history survives.
    ///
    /// A task that still has subtasks fails with
    /// [`CoreError::DependentRecords`] and nothing is changed.
    pub async fn delete_task(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<DeletionSummary, CoreError> {
        let task = self
            .repo
            .get_task(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        // Children are only touched once the template itself is deletable.
        if self.repo.has_dependents(id).await? {
            return Err(CoreError::DependentRecords(id.to_string()));
        }

        let summary = if task.is_template() {
            TemplateRegenerator::new(&self.repo)
                .cascade_delete(&task, now)
                .await?
        } else {
            DeletionSummary::default()
        };

        self.repo.delete_task(id).await?;
        Ok(summary)
    }

    /// Virtual occurrences for every template in the store.
    pub async fn upcoming(
        &self,
        status_filter: Option<&[TaskStatus]>,
        now: DateTime<Utc>,
    ) -> Result<Vec<ProjectedTask>, CoreError> {
        let templates = self.repo.list_templates().await?;
        let mut projected: Vec<ProjectedTask> =
            self.expander.expand(&templates, status_filter, now).collect();
        projected.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.id.cmp(&b.id)));
        Ok(projected)
    }

    /// Preview of task `id`, rendered in `timezone` or the configured default.
    pub async fn preview(
        &self,
        id: Uuid,
        start_from: Option<DateTime<Utc>>,
        timezone: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<PreviewEntry>, CoreError> {
        let task = self
            .repo
            .get_task(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        let zone = timezone.unwrap_or(&self.config.default_timezone);
        self.previewer.preview(&task, start_from, zone, now)
    }

    async fn log_completion(&self, advancement: &Advancement) {
        if let Err(e) = self
            .repo
            .append_completion(advancement.completion.clone())
            .await
        {
            tracing::warn!(
                task_id = %advancement.task_id,
                error = %e,
                "failed to append completion"
            );
        }
        if let Err(e) = self.repo.record(advancement.event()).await {
            tracing::warn!(task_id = %advancement.task_id, error = %e, "failed to record event");
        }
    }
}
