mod app;
mod commands;
mod form;
mod pin;
mod render;

use std::io::IsTerminal;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use weektable_core::EventId;

use crate::app::App;

#[derive(Parser)]
#[command(name = "weektable")]
#[command(about = "Your week at a glance: recurring events, PIN-protected editing")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse weeks interactively (default)
    Browse,
    /// Print one week's agenda
    Week {
        /// Weeks from the current one (negative for past weeks)
        #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i64,
    },
    /// Add a recurring event
    Add,
    /// Edit an event by id
    Edit { id: EventId },
    /// Delete an event by id
    Delete { id: EventId },
    /// Open settings
    Settings,
    /// Forget the saved credential
    Lock,
    /// Manage the PIN
    Pin {
        #[command(subcommand)]
        action: PinAction,
    },
    /// Show session and service status
    Status,
}

#[derive(Subcommand)]
enum PinAction {
    /// Change the PIN (requires an unlocked session)
    Change,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let mut app = App::start().await?;

    match cli.command.unwrap_or(Commands::Browse) {
        Commands::Browse => commands::browse::run(&mut app).await,
        Commands::Week { offset } => commands::week::run(&mut app, offset),
        Commands::Add => commands::add::run(&mut app).await,
        Commands::Edit { id } => commands::edit::run(&mut app, id).await,
        Commands::Delete { id } => commands::delete::run(&mut app, id).await,
        Commands::Settings => commands::settings::run(&mut app).await,
        Commands::Lock => commands::lock::run(&mut app),
        Commands::Pin {
            action: PinAction::Change,
        } => commands::pin::change(&mut app).await,
        Commands::Status => commands::status::run(&mut app).await,
    }
}

/// Logs go to stderr so they never interleave with rendered weeks.
/// `WEEKTABLE_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };

    let env_filter = EnvFilter::try_from_env("WEEKTABLE_LOG")
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid WEEKTABLE_LOG filter: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn week_accepts_negative_offset() {
        let cli = Cli::try_parse_from(["weektable", "week", "--offset", "-2"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Week { offset: -2 })));
    }

    #[test]
    fn no_subcommand_means_browse() {
        let cli = Cli::try_parse_from(["weektable", "-v"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.verbose);
    }

    #[test]
    fn edit_takes_numeric_id() {
        let cli = Cli::try_parse_from(["weektable", "edit", "12"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Edit { id: EventId(12) })));
        assert!(Cli::try_parse_from(["weektable", "edit", "twelve"]).is_err());
    }
}
