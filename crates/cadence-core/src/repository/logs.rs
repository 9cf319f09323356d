use crate::error::CoreError;
use crate::models::{RecurringCompletion, TaskEvent};
use crate::repository::InMemoryRepository;
use async_trait::async_trait;

#[async_trait]
impl super::CompletionLog for InMemoryRepository {
    async fn append_completion(&self, completion: RecurringCompletion) -> Result<(), CoreError> {
        self.completions.write().await.push(completion);
        Ok(())
    }
}

#[async_trait]
impl super::EventLog for InMemoryRepository {
    async fn record(&self, event: TaskEvent) -> Result<(), CoreError> {
        if self.fail_event_log {
            return Err(CoreError::EventLog(format!(
                "event sink unavailable for {}",
                event.event_type
            )));
        }
        self.events.write().await.push(event);
        Ok(())
    }
}
