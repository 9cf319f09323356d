use cadence_core::models::SchedulingConfig;
use cadence_core::timezone::validate_timezone;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const CONFIG_FILE: &str = "cadence.toml";
const DEFAULT_TASKS_FILE: &str = "tasks.json";

#[derive(Deserialize, Serialize, Debug)]
pub struct Config {
    /// JSON file holding the task list
    pub tasks_file: PathBuf,
    pub scheduling: SchedulingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tasks_file: PathBuf::from(DEFAULT_TASKS_FILE),
            scheduling: SchedulingConfig {
                default_timezone: detect_system_timezone(),
                ..Default::default()
            },
        }
    }
}

impl Config {
    /// Defaults, then `cadence.toml`, then `CADENCE_*` environment variables.
    ///
    /// Nested keys use a double underscore, e.g. `CADENCE_SCHEDULING__WINDOW_DAYS`.
    pub fn new() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("CADENCE_").split("__"))
    }
}

/// Detects the system timezone, falling back to UTC if detection fails
pub fn detect_system_timezone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        if validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    if let Ok(local_tz) = iana_time_zone::get_timezone() {
        if validate_timezone(&local_tz).is_ok() {
            return local_tz;
        }
    }

    "UTC".to_string()
}
