use crate::error::CoreError;
use crate::models::{Task, TaskPatch};
use crate::repository::InMemoryRepository;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

#[async_trait]
impl super::TaskStore for InMemoryRepository {
    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, CoreError> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn list_templates(&self) -> Result<Vec<Task>, CoreError> {
        let tasks = self.tasks.read().await;
        let mut templates: Vec<Task> =
            tasks.values().filter(|t| t.is_template()).cloned().collect();
        templates.sort_by_key(|t| (t.created_at, t.id));
        Ok(templates)
    }

    async fn find_template_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&id).filter(|t| t.is_template()).cloned())
    }

    async fn find_children_of(&self, template_id: Uuid) -> Result<Vec<Task>, CoreError> {
        let tasks = self.tasks.read().await;
        let mut children: Vec<Task> = tasks
            .values()
            .filter(|t| t.recurring_parent_id == Some(template_id))
            .cloned()
            .collect();
        children.sort_by_key(|t| (t.due_date, t.id));
        Ok(children)
    }

    async fn apply_patch(&self, id: Uuid, patch: &TaskPatch) -> Result<Task, CoreError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(&id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        let mut updated = patch.apply_to(task);
        updated.updated_at = Utc::now();
        *task = updated.clone();
        Ok(updated)
    }

    async fn has_dependents(&self, id: Uuid) -> Result<bool, CoreError> {
        let tasks = self.tasks.read().await;
        Ok(tasks.values().any(|t| t.parent_id == Some(id)))
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), CoreError> {
        let mut tasks = self.tasks.write().await;
        if !tasks.contains_key(&id) {
            return Err(CoreError::NotFound(id.to_string()));
        }
        if tasks.values().any(|t| t.parent_id == Some(id)) {
            return Err(CoreError::DependentRecords(id.to_string()));
        }
        tasks.remove(&id);
        Ok(())
    }
}
