//! Command dispatch: bridges CLI args -> workspace operations -> output formatting.

pub mod config_cmd;
pub mod resume;
pub mod todos;
pub mod util;

use taskdeck_core::Workspace;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    workspace: &Workspace,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Todos(args) => todos::handle(workspace, args, global).await,
        Command::Resume(args) => resume::handle(workspace, args, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are handled before dispatch".into(),
        )),
    }
}
