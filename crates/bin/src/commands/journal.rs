//! Journal day commands: show, add, delete and move entries.

use journo::{model::Journum, notice::Notice, session::Session};

use super::CommandResult;
use crate::{
    cli::{DayArgs, JournalCommand},
    output::{OutputFormat, print_json, print_table},
};

pub async fn run(command: &JournalCommand, session: &mut Session, format: OutputFormat) -> CommandResult {
    let day = match command {
        JournalCommand::Show { day }
        | JournalCommand::Add { day, .. }
        | JournalCommand::Delete { day, .. }
        | JournalCommand::Move { day, .. } => *day,
    };
    let mut cursor = open(session, day).await?;
    let journum = cursor
        .current_mut()
        .ok_or("journal day failed to open")?;

    match command {
        JournalCommand::Show { .. } => {}
        JournalCommand::Add { text, tags, .. } => {
            let key = journum.add_entry(text, tags)?;
            tracing::info!(day = %journum.date(), key, "Added entry");
        }
        JournalCommand::Delete { key, .. } => {
            let undo = journum.delete_entry(key)?;
            session.notices_mut().push(Notice::with_undo(undo));
        }
        JournalCommand::Move { key, delta, .. } => {
            if !journum.move_entry(key, *delta)? {
                session.notices_mut().push(Notice::new(format!("Entry {key} is already there")));
            }
        }
    }

    show(journum, format)?;
    cursor.close();
    Ok(())
}

async fn open(session: &Session, day: DayArgs) -> journo::Result<journo::journal::JournalCursor> {
    match day.date {
        Some(date) => session.journal(date).await,
        None => session.today().await,
    }
}

fn show(journum: &Journum, format: OutputFormat) -> CommandResult {
    match format {
        OutputFormat::Human => {
            println!("{}", journum.date());
            let rows: Vec<Vec<String>> = journum
                .entries()
                .iter()
                .map(|entry| {
                    vec![
                        entry.key().to_string(),
                        entry.text().to_string(),
                        entry.tags().join(" "),
                    ]
                })
                .collect();
            print_table(&["KEY", "TEXT", "TAGS"], &rows);
        }
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = journum
                .entries()
                .iter()
                .map(|entry| {
                    serde_json::json!({
                        "key": entry.key(),
                        "text": entry.text(),
                        "tags": entry.tags(),
                        "item": entry.item(),
                    })
                })
                .collect();
            print_json(&serde_json::json!({
                "date": journum.date().to_string(),
                "entries": entries,
            }))?;
        }
    }
    Ok(())
}
