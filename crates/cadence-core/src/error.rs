use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Raised by a task store when other rows still reference the task.
    #[error("Task {0} is still referenced by dependent records")]
    DependentRecords(String),

    #[error("Event log error: {0}")]
    EventLog(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
