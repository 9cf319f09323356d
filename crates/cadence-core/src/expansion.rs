use chrono::{DateTime, Duration, Utc};

use crate::models::{ProjectedTask, SchedulingConfig, Task, TaskStatus};
use crate::recurrence::{catch_up, next_date, start_of_day, Occurrences, MAX_VIRTUAL_OCCURRENCES};

/// VirtualOccurrenceExpander: projects upcoming occurrences of recurring
/// templates for list views without persisting anything.
///
/// Each call recomputes from the templates as given; the returned iterator is
/// lazy and finite.
#[derive(Debug, Clone)]
pub struct VirtualOccurrenceExpander {
    window_days: u32,
}

impl VirtualOccurrenceExpander {
    pub fn new(window_days: u32) -> Self {
        Self { window_days }
    }

    pub fn from_config(config: &SchedulingConfig) -> Self {
        Self::new(config.window_days)
    }

    /// Projects virtual occurrences for every eligible template in `templates`.
    ///
    /// # Arguments
    /// * `templates` - Candidate tasks; non-templates are ignored
    /// * `status_filter` - Statuses the caller is listing. Virtual occurrences
    ///   are always `not_started`, so a filter without it yields nothing
    /// * `now` - Reference instant for "today" and the window horizon
    pub fn expand<'a>(
        &self,
        templates: &'a [Task],
        status_filter: Option<&[TaskStatus]>,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = ProjectedTask> + 'a {
        let window_days = self.window_days;
        let wanted =
            status_filter.map_or(true, |statuses| statuses.contains(&TaskStatus::NotStarted));

        templates
            .iter()
            .filter(move |task| wanted && task.is_template())
            .flat_map(move |template| project_template(template, window_days, now))
    }

    /// Projections for a single template, collected.
    pub fn expand_template(&self, template: &Task, now: DateTime<Utc>) -> Vec<ProjectedTask> {
        if !template.is_template() {
            return Vec::new();
        }
        project_template(template, self.window_days, now).collect()
    }
}

/// Day from which a template's projections are searched.
///
/// # Behavior
/// - Done template: the day after its next true occurrence, computed from the
///   completion time (completion-based) or the prior due date
/// - Due today or later: the due date itself
/// - Overdue: the due date rolled forward to today, bounded by the catch-up limit
/// - No due date: today
pub fn search_start(template: &Task, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let config = &template.recurrence;
    let today = start_of_day(now);

    if template.status == TaskStatus::Done {
        let basis = if config.completion_based {
            template.completed_at
        } else {
            template.due_date
        };
        let next = next_date(config, basis.unwrap_or(now))?;
        return next.checked_add_signed(Duration::days(1));
    }

    match template.due_date {
        Some(due) if due >= today => Some(due),
        Some(due) => catch_up(config, due, today),
        None => Some(today),
    }
}

fn project_template(
    template: &Task,
    window_days: u32,
    now: DateTime<Utc>,
) -> impl Iterator<Item = ProjectedTask> + '_ {
    // Past chrono's range the window is effectively unbounded.
    let horizon = now
        .checked_add_signed(Duration::days(i64::from(window_days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let occurrences = match search_start(template, now) {
        Some(start) => {
            Occurrences::from_anchor(&template.recurrence, start, MAX_VIRTUAL_OCCURRENCES)
        }
        None => {
            tracing::trace!(template_id = %template.id, "no search start for template");
            Occurrences::starting_at(&template.recurrence, None, 0)
        }
    };

    occurrences
        .take_while(move |due| *due <= horizon)
        .enumerate()
        .map(move |(index, due)| project(template, index, due))
}

fn project(template: &Task, index: usize, due: DateTime<Utc>) -> ProjectedTask {
    let mut task = template.clone();
    task.due_date = Some(due);
    task.status = TaskStatus::NotStarted;
    task.completed_at = None;

    ProjectedTask {
        id: ProjectedTask::virtual_id(template.id, index),
        template_id: template.id,
        occurrence_index: index,
        is_virtual_occurrence: true,
        due_date: due,
        task,
    }
}
