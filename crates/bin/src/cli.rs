//! CLI argument definitions for the Journo binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use journo::{Stamp, model::ItemKind};

use crate::output::OutputFormat;

/// Journo: a journal and to-do tracker
#[derive(Parser, Debug)]
#[command(name = "journo")]
#[command(about = "Journo: journal days and tracked items over a local document store")]
#[command(version)]
pub struct Cli {
    /// JSON file holding the document store
    #[arg(short = 'D', long, default_value = "journo.json", env = "JOURNO_DATA_FILE")]
    pub data_file: PathBuf,

    /// User whose data to work with
    #[arg(short, long, default_value = "local", env = "JOURNO_USER")]
    pub user: String,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read and edit journal days
    #[command(subcommand)]
    Journal(JournalCommand),
    /// Read and edit tracked items
    #[command(subcommand)]
    Items(ItemsCommand),
}

/// Which day to open. Defaults to today.
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct DayArgs {
    /// Day to open (yyyy-mm-dd)
    #[arg(short, long)]
    pub date: Option<Stamp>,
}

#[derive(Subcommand, Debug)]
pub enum JournalCommand {
    /// Show a day's entries in order
    Show {
        #[command(flatten)]
        day: DayArgs,
    },
    /// Add an entry at the end of the day
    Add {
        #[command(flatten)]
        day: DayArgs,
        /// Entry text
        text: String,
        /// Tag to attach (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// Delete an entry by key
    Delete {
        #[command(flatten)]
        day: DayArgs,
        key: String,
    },
    /// Move an entry up (negative) or down (positive)
    Move {
        #[command(flatten)]
        day: DayArgs,
        key: String,
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum ItemsCommand {
    /// List incomplete items, or the items completed in a year
    List {
        kind: ItemKind,
        /// Show items completed in this year instead
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Add an item
    Add { kind: ItemKind, text: String },
    /// Mark an item completed
    Complete {
        kind: ItemKind,
        id: String,
        /// Completion day (yyyy-mm-dd); defaults to today
        #[arg(long)]
        on: Option<Stamp>,
    },
    /// Delete an item
    Delete { kind: ItemKind, id: String },
}
