use crate::error::CoreError;
use crate::models::{RecurringCompletion, Task, TaskEvent, TaskPatch};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

pub mod logs;
pub mod tasks;

// Collaborator contracts. The engine calls these but never owns storage.

/// Domain-specific trait for task storage
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, CoreError>;
    /// Recurring tasks that are not generated children.
    async fn list_templates(&self) -> Result<Vec<Task>, CoreError>;
    async fn find_template_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError>;
    async fn find_children_of(&self, template_id: Uuid) -> Result<Vec<Task>, CoreError>;
    async fn apply_patch(&self, id: Uuid, patch: &TaskPatch) -> Result<Task, CoreError>;
    /// Whether other rows (subtasks) still reference the task.
    async fn has_dependents(&self, id: Uuid) -> Result<bool, CoreError>;
    /// Fails with [`CoreError::DependentRecords`] when other rows reference the task.
    async fn delete_task(&self, id: Uuid) -> Result<(), CoreError>;
}

/// Append-only log of advanced occurrences
#[async_trait]
pub trait CompletionLog: Send + Sync {
    async fn append_completion(&self, completion: RecurringCompletion) -> Result<(), CoreError>;
}

/// Domain event sink
#[async_trait]
pub trait EventLog: Send + Sync {
    async fn record(&self, event: TaskEvent) -> Result<(), CoreError>;
}

/// Main repository trait that composes all collaborator traits
pub trait Repository: TaskStore + CompletionLog + EventLog {}

impl<T: TaskStore + CompletionLog + EventLog> Repository for T {}

/// In-memory implementation of the collaborator traits.
///
/// Subtask links (`parent_id`) behave like a foreign key: a task that still
/// has subtasks cannot be deleted.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    tasks: RwLock<HashMap<Uuid, Task>>,
    completions: RwLock<Vec<RecurringCompletion>>,
    events: RwLock<Vec<TaskEvent>>,
    fail_event_log: bool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            tasks: RwLock::new(tasks.into_iter().map(|t| (t.id, t)).collect()),
            ..Default::default()
        }
    }

    /// Makes every `EventLog::record` call fail.
    pub fn failing_event_log(mut self) -> Self {
        self.fail_event_log = true;
        self
    }

    pub async fn insert_task(&self, task: Task) -> Task {
        self.tasks.write().await.insert(task.id, task.clone());
        task
    }

    pub async fn find_task_by_id(&self, id: Uuid) -> Option<Task> {
        self.tasks.read().await.get(&id).cloned()
    }

    /// All tasks ordered by creation time.
    pub async fn all_tasks(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.read().await.values().cloned().collect();
        tasks.sort_by_key(|t| (t.created_at, t.id));
        tasks
    }

    pub async fn completions(&self) -> Vec<RecurringCompletion> {
        self.completions.read().await.clone()
    }

    pub async fn events(&self) -> Vec<TaskEvent> {
        self.events.read().await.clone()
    }
}
