//! Subcommand implementations.

pub mod items;
pub mod journal;

use journo::session::Session;

use crate::{cli::Commands, output::OutputFormat};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Dispatch one parsed command against a logged in session.
pub async fn run(command: &Commands, session: &mut Session, format: OutputFormat) -> CommandResult {
    match command {
        Commands::Journal(cmd) => journal::run(cmd, session, format).await,
        Commands::Items(cmd) => items::run(cmd, session, format).await,
    }
}
