use anyhow::{anyhow, Result};
use cadence_core::error::CoreError;
use cadence_core::models::Task;
use cadence_core::repository::InMemoryRepository;

pub const SHORT_ID_LEN: usize = 8;

/// Shortened display form of a task id.
pub fn short_id(task: &Task) -> String {
    task.id.to_string().chars().take(SHORT_ID_LEN).collect()
}

/// Resolves a full id or unique id prefix to a stored task.
pub async fn resolve_task(repo: &InMemoryRepository, short_id: &str) -> Result<Task> {
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    let prefix = short_id.to_lowercase();
    let mut matches: Vec<Task> = repo
        .all_tasks()
        .await
        .into_iter()
        .filter(|t| t.id.to_string().starts_with(&prefix))
        .collect();

    match matches.len() {
        1 => Ok(matches.remove(0)),
        0 => Err(anyhow!(CoreError::NotFound(format!(
            "No task found with ID prefix '{}'",
            short_id
        )))),
        _ => {
            let candidates: Vec<String> = matches
                .iter()
                .map(|t| format!("{} ({})", t.id, t.name))
                .collect();
            Err(anyhow!(CoreError::InvalidInput(format!(
                "Ambiguous ID '{}' matches: {}",
                short_id,
                candidates.join(", ")
            ))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn task_with_id(id: &str, name: &str) -> Task {
        Task {
            id: Uuid::parse_str(id).unwrap(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_resolve_by_prefix() {
        let repo = InMemoryRepository::with_tasks(vec![
            task_with_id("0190a1b2-0000-7000-8000-000000000001", "First"),
            task_with_id("0190a1b3-0000-7000-8000-000000000002", "Second"),
        ]);

        assert_eq!(resolve_task(&repo, "0190a1b3").await.unwrap().name, "Second");
        assert!(resolve_task(&repo, "0190a1").await.is_err());
        assert!(resolve_task(&repo, "ff").await.is_err());
        assert!(resolve_task(&repo, "0").await.is_err());
    }
}
