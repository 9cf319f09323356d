use assert_cmd::Command;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test harness for running CLI commands against a temporary task file
pub struct CliTestHarness {
    temp_dir: TempDir,
    tasks_path: PathBuf,
}

impl CliTestHarness {
    /// Create a new test harness with an empty temporary directory
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let tasks_path = temp_dir.path().join("tasks.json");

        Self {
            temp_dir,
            tasks_path,
        }
    }

    /// Create a harness whose task file already holds `tasks`
    pub fn with_tasks(tasks: Vec<Value>) -> Self {
        let harness = Self::new();
        harness.write_tasks(&Value::Array(tasks));
        harness
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("cadence").expect("Failed to find cadence binary");

        // Keep stray cadence.toml files and host settings out of the run
        cmd.current_dir(self.temp_dir.path());
        cmd.env("CADENCE_TASKS_FILE", &self.tasks_path);
        cmd.env("TZ", "UTC");
        cmd.env_remove("RUST_LOG");

        cmd
    }

    pub fn tasks_path(&self) -> &Path {
        &self.tasks_path
    }

    pub fn write_tasks(&self, tasks: &Value) {
        let contents = serde_json::to_string_pretty(tasks).expect("Failed to encode tasks");
        std::fs::write(&self.tasks_path, contents).expect("Failed to write task file");
    }

    /// Tasks currently stored in the task file
    pub fn read_tasks(&self) -> Vec<Value> {
        let contents = std::fs::read_to_string(&self.tasks_path).expect("Failed to read task file");
        serde_json::from_str(&contents).expect("Task file is not valid JSON")
    }

    pub fn find_task(&self, id: &str) -> Option<Value> {
        self.read_tasks().into_iter().find(|t| t["id"] == id)
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }
}

/// Common test fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const TEMPLATE_ID: &'static str = "01900000-0000-7000-8000-000000000001";
    pub const PAST_CHILD_ID: &'static str = "01900000-0000-7000-8000-000000000002";
    pub const FUTURE_CHILD_ID: &'static str = "01900000-0000-7000-8000-000000000003";

    /// Daily template, interval 2, due 2025-01-01
    pub fn daily_template() -> Value {
        json!({
            "id": Self::TEMPLATE_ID,
            "name": "Water plants",
            "status": "not_started",
            "due_date": "2025-01-01T00:00:00Z",
            "recurrence_type": "daily",
            "recurrence_interval": 2
        })
    }

    /// Weekly template on Mondays
    pub fn weekly_template() -> Value {
        json!({
            "id": Self::TEMPLATE_ID,
            "name": "Team review",
            "due_date": "2099-01-05T00:00:00Z",
            "recurrence_type": "weekly",
            "recurrence_weekday": 1
        })
    }

    /// Template plus one long-past and one far-future generated child
    pub fn template_with_children() -> Vec<Value> {
        let child = |id: &str, due: &str| {
            json!({
                "id": id,
                "name": "Team review",
                "due_date": due,
                "recurring_parent_id": Self::TEMPLATE_ID
            })
        };
        vec![
            Self::weekly_template(),
            child(Self::PAST_CHILD_ID, "2020-01-06T00:00:00Z"),
            child(Self::FUTURE_CHILD_ID, "2099-01-12T00:00:00Z"),
        ]
    }
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    /// Predicate to check if output contains task table headers
    pub fn has_task_table_headers() -> impl Predicate<str> {
        predicate::str::contains("ID")
            .and(predicate::str::contains("Name"))
            .and(predicate::str::contains("Status"))
    }

    /// Predicate to check for error messages
    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }
}
