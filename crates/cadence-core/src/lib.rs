//! # Cadence Core Library
//!
//! Scheduling engine for recurring tasks: computes next occurrence dates,
//! rolls completed templates forward, projects virtual occurrences for list
//! views and keeps generated children in step with their template.
//!
//! ## Features
//!
//! - **Recurrence Arithmetic**: Daily, weekly (single weekday or weekday set)
//!   and monthly patterns computed on UTC calendar days
//! - **Completion Advancement**: Fixed-schedule or completion-based rollover
//!   with a pluggable generation policy
//! - **Virtual Occurrences**: Bounded, lazily evaluated projections that are
//!   never persisted
//! - **Template Regeneration**: Stale future children are purged after edits;
//!   past children survive template deletion as standalone tasks
//! - **Timezone Previews**: IANA zone rendering at the presentation boundary only
//!
//! ## Core Modules
//!
//! - [`models`]: Core data structures and the tri-state patch type
//! - [`recurrence`]: Next-date calculation and day matching
//! - [`expansion`]: Virtual occurrence projection
//! - [`completion`]: Advancement of completed templates
//! - [`regeneration`]: Child regeneration and the deletion cascade
//! - [`preview`]: Timezone-rendered occurrence previews
//! - [`repository`]: Collaborator traits and an in-memory store
//! - [`service`]: Async orchestration over a [`repository::Repository`]
//! - [`timezone`]: Timezone utilities and validation
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use cadence_core::{
//!     models::{RecurrenceConfig, SchedulingConfig, Task},
//!     repository::InMemoryRepository,
//!     service::SchedulingService,
//! };
//! use chrono::Utc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cadence_core::error::CoreError> {
//!     let task = Task {
//!         name: "Water plants".to_string(),
//!         due_date: Some(Utc::now()),
//!         recurrence: RecurrenceConfig::daily(2),
//!         ..Default::default()
//!     };
//!     let id = task.id;
//!
//!     let service = SchedulingService::new(
//!         InMemoryRepository::with_tasks([task]),
//!         SchedulingConfig::default(),
//!     );
//!
//!     let update = service.complete_task(id, Utc::now()).await?;
//!     println!("Next due: {:?}", update.task.due_date);
//!
//!     Ok(())
//! }
//! ```

pub mod completion;
pub mod error;
pub mod expansion;
pub mod models;
pub mod preview;
pub mod recurrence;
pub mod regeneration;
pub mod repository;
pub mod service;
pub mod timezone;
