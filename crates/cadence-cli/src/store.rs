use anyhow::{Context, Result};
use cadence_core::models::Task;
use cadence_core::repository::InMemoryRepository;
use std::path::PathBuf;

/// JSON-backed task list. The whole file is loaded into an
/// [`InMemoryRepository`] and written back after mutating commands.
pub struct TaskFile {
    path: PathBuf,
}

impl TaskFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the task file. A missing file is an empty task list.
    pub async fn load(&self) -> Result<InMemoryRepository> {
        let tasks: Vec<Task> = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Vec::new(),
            Ok(contents) => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse task file {}", self.path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read task file {}", self.path.display()))
            }
        };
        tracing::debug!(path = %self.path.display(), count = tasks.len(), "loaded tasks");
        Ok(InMemoryRepository::with_tasks(tasks))
    }

    pub async fn save(&self, repo: &InMemoryRepository) -> Result<()> {
        let tasks = repo.all_tasks().await;
        let contents = serde_json::to_string_pretty(&tasks)?;
        tokio::fs::write(&self.path, contents)
            .await
            .with_context(|| format!("Failed to write task file {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }
}
