//! Todo command handlers.

use std::sync::Arc;

use tabled::Tabled;
use taskdeck_core::{CollectionSnapshot, Item, Workspace};

use crate::cli::{GlobalOpts, TodosArgs, TodosCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct TodoRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Todo")]
    text: String,
}

impl From<&Arc<Item>> for TodoRow {
    fn from(item: &Arc<Item>) -> Self {
        Self {
            id: item.id.to_string(),
            text: item.text.clone(),
        }
    }
}

fn print_snapshot(snapshot: &CollectionSnapshot, global: &GlobalOpts) {
    let out = output::render_list(
        &global.format(),
        snapshot.items(),
        |item| TodoRow::from(item),
        |item| item.text.clone(),
    );
    output::print_output(&out, global.quiet);
}

fn report(message: Option<String>, fallback: &str, global: &GlobalOpts) {
    if !global.quiet {
        eprintln!("{}", message.as_deref().unwrap_or(fallback));
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    workspace: &Workspace,
    args: TodosArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        TodosCommand::List => {
            workspace.refresh().await?;
            print_snapshot(&workspace.snapshot(), global);
            Ok(())
        }

        TodosCommand::Add { text } => {
            let outcome = workspace.create_item(text.join(" ")).await?;
            report(outcome.message, "Todo added", global);
            print_snapshot(&outcome.snapshot, global);
            Ok(())
        }

        TodosCommand::Update { id, text } => {
            let id = util::parse_item_id(&id)?;
            let outcome = workspace.update_item(&id, text.join(" ")).await?;
            report(outcome.message, "Todo updated", global);
            print_snapshot(&outcome.snapshot, global);
            Ok(())
        }

        TodosCommand::Delete { id } => {
            let id = util::parse_item_id(&id)?;
            if !util::confirm(&format!("Delete todo {id}?"), "todos delete", global.yes)? {
                return Ok(());
            }
            let outcome = workspace.delete_item(&id).await?;
            report(outcome.message, "Todo deleted", global);
            print_snapshot(&outcome.snapshot, global);
            Ok(())
        }
    }
}
