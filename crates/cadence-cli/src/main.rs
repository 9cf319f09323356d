use anyhow::Context;
use cadence_core::error::CoreError;
use cadence_core::service::SchedulingService;
use chrono::Utc;
use clap::Parser;
use owo_colors::{OwoColorize, Style};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, UpcomingCommand};
use store::TaskFile;

mod cli;
mod commands;
mod config;
mod parser;
mod store;
mod util;
mod views;

#[tokio::main]
async fn main() {
    // Logs go to stderr so table output stays pipeable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cadence_cli=info,cadence_core=warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        handle_error(e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = config::Config::new().context("Failed to load configuration")?;
    if let Some(file) = cli.file {
        config.tasks_file = file;
    }
    if let Commands::Upcoming(UpcomingCommand {
        window: Some(days), ..
    }) = &cli.command
    {
        config.scheduling.window_days = *days;
    }

    let file = TaskFile::new(&config.tasks_file);
    let service = SchedulingService::new(file.load().await?, config.scheduling);
    let now = Utc::now();

    let mutated = match cli.command {
        Commands::Add(command) => {
            commands::add::add_task(&service, command, now).await?;
            true
        }
        Commands::List(command) => {
            commands::list::list_tasks(&service, command, now).await?;
            false
        }
        Commands::Preview(command) => {
            commands::preview::preview_task(&service, command, now).await?;
            false
        }
        Commands::Next(command) => {
            commands::next::next_occurrence(&service, command, now).await?;
            false
        }
        Commands::Upcoming(command) => {
            commands::upcoming::list_upcoming(&service, command, now).await?;
            false
        }
        Commands::Complete(command) => {
            commands::complete::complete_task(&service, command, now).await?;
            true
        }
        Commands::Edit(command) => {
            commands::edit::edit_task(&service, command, now).await?;
            true
        }
        Commands::Delete(command) => {
            commands::delete::delete_task(&service, command, now).await?;
            true
        }
    };

    if mutated {
        file.save(service.repository()).await?;
    }
    Ok(())
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    match err.chain().find_map(|e| e.downcast_ref::<CoreError>()) {
        Some(CoreError::NotFound(s)) => {
            eprintln!("{} {}", "Error:".style(error_style), s);
        }
        Some(CoreError::InvalidInput(s)) => {
            eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
        }
        Some(CoreError::InvalidTimezone(s)) => {
            eprintln!(
                "{} {}. Use IANA names like {}",
                "Error:".style(error_style),
                s,
                "America/New_York".yellow()
            );
        }
        Some(CoreError::DependentRecords(id)) => {
            eprintln!(
                "{} Task {} still has subtasks; delete them first",
                "Error:".style(error_style),
                id.yellow()
            );
        }
        _ => eprintln!("{} {:#}", "Error:".style(error_style), err),
    }
}
