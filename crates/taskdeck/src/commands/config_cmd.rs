//! Config subcommand handlers.

use dialoguer::Input;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util;

const DEFAULT_SERVER: &str = "http://localhost:8000";

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_server() -> Result<String, CliError> {
    Input::new()
        .with_prompt("Server URL")
        .default(DEFAULT_SERVER.to_owned())
        .interact_text()
        .map_err(prompt_err)
}

fn format_config(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("error: serialization failed: {e}"))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => {
            let path = config::config_path();
            if path.exists()
                && !util::confirm(
                    &format!("Overwrite existing config at {}?", path.display()),
                    "config init",
                    global.yes,
                )?
            {
                return Ok(());
            }

            let server = match global.server {
                Some(ref server) => server.clone(),
                None => prompt_server()?,
            };

            let starter = Config::starter(&server);
            // Reject a bad URL before it is written to disk.
            if let Some((_, profile)) = starter.select_profile(None)? {
                config::profile_to_client_config(profile, &starter.defaults)?;
            }

            let written = config::save_config(&starter)?;
            if !global.quiet {
                eprintln!("✓ Configuration written to {}", written.display());
                eprintln!("  Test it: taskdeck todos list");
            }
            Ok(())
        }

        ConfigCommand::Show => {
            // Table and plain both show the file as it would be written.
            let out = output::render_single(&global.format(), cfg, format_config, format_config);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}
