//! Item commands: list, add, complete and delete.

use journo::{
    model::{Item, ItemKind, Items, ItemsQuery},
    notice::Notice,
    session::Session,
};

use super::CommandResult;
use crate::{
    cli::ItemsCommand,
    output::{OutputFormat, print_json, print_table},
};

pub async fn run(command: &ItemsCommand, session: &mut Session, format: OutputFormat) -> CommandResult {
    match command {
        ItemsCommand::List { kind, year } => {
            let query = match year {
                Some(year) => ItemsQuery::CompletedIn(*year),
                None => ItemsQuery::Incomplete,
            };
            let items = load(session, *kind, query);
            list(&items, format)?;
        }
        ItemsCommand::Add { kind, text } => {
            let items = load(session, *kind, ItemsQuery::Incomplete);
            let reference = items
                .add_item(text)
                .await
                .ok_or_else(|| format!("could not add {kind} item"))?;
            match format {
                OutputFormat::Human => println!("Added {}", reference.id()),
                OutputFormat::Json => print_json(&serde_json::json!({ "id": reference.id() }))?,
            }
        }
        ItemsCommand::Complete { kind, id, on } => {
            let mut items = load(session, *kind, ItemsQuery::Incomplete);
            let on = on.unwrap_or_else(|| session.clock().today());
            let item = items
                .item_mut(id)
                .ok_or_else(|| format!("no incomplete {kind} item {id}"))?;
            item.complete(on)?;
            session
                .notices_mut()
                .push(Notice::new(format!("Completed '{}' on {on}", item.title())));
        }
        ItemsCommand::Delete { kind, id } => {
            let mut items = load(session, *kind, ItemsQuery::Incomplete);
            if items.item(id).is_none() {
                items.set_query(ItemsQuery::CompletedIn(session.clock().today().year()));
                items.sync();
            }
            let undo = items.delete_item(id)?;
            session.notices_mut().push(Notice::with_undo(undo));
        }
    }
    Ok(())
}

/// Opens a query and applies the snapshots already delivered.
fn load(session: &Session, kind: ItemKind, query: ItemsQuery) -> Items {
    let mut items = session.items(kind, query);
    items.sync();
    items
}

fn list(items: &Items, format: OutputFormat) -> CommandResult {
    let sorted = items.sorted_items();
    match format {
        OutputFormat::Human => {
            let rows: Vec<Vec<String>> = sorted.iter().map(|item| row(item)).collect();
            print_table(&["ID", "TITLE", "TAGS", "STATUS"], &rows);
        }
        OutputFormat::Json => {
            let docs: Vec<serde_json::Value> = sorted
                .iter()
                .map(|item| {
                    let mut value = item.to_doc().to_json();
                    if let Some(map) = value.as_object_mut() {
                        map.insert("id".to_string(), item.id().into());
                    }
                    value
                })
                .collect();
            print_json(&serde_json::Value::Array(docs))?;
        }
    }
    Ok(())
}

fn row(item: &Item) -> Vec<String> {
    let status = match (item.completed(), item.started()) {
        (Some(on), _) => format!("done {on}"),
        (None, Some(on)) if item.is_started() => format!("started {on}"),
        _ => String::new(),
    };
    vec![
        item.id().to_string(),
        item.title().to_string(),
        item.tags().join(" "),
        status,
    ]
}
