use std::sync::Arc;

use clap::Parser;
use journo::{
    Clock, SystemClock,
    session::{Session, SessionConfig},
    store::MemoryStore,
};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;

use cli::Cli;
use output::OutputFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("journo=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(MemoryStore::load_from_file(&cli.data_file, clock.clone()).await?);
    tracing::debug!(path = %cli.data_file.display(), documents = store.len(), "Loaded store");

    let mut session = Session::login(SessionConfig::new(&cli.user), store.clone(), clock)?;
    let result = commands::run(&cli.command, &mut session, cli.format).await;

    if cli.format == OutputFormat::Human {
        while let Some(notice) = session.notices_mut().dismiss() {
            match notice.undo {
                Some(_) => eprintln!("{} (not undone)", notice.message),
                None => eprintln!("{}", notice.message),
            }
        }
    }
    session.logout().await;

    match store.save_to_file(&cli.data_file).await {
        Ok(()) => tracing::debug!("Store saved"),
        Err(e) => {
            tracing::error!("Failed to save store: {e}");
            return Err(e.into());
        }
    }
    result
}
