//! Clap derive structures for the `taskdeck` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// taskdeck -- todo list and resume highlight client
#[derive(Debug, Parser)]
#[command(
    name = "taskdeck",
    version,
    about = "Manage todos and improve resume highlights from the command line",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "TASKDECK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, short = 's', env = "TASKDECK_SERVER", global = true)]
    pub server: Option<String>,

    /// Output format [default: table, or `defaults.output` from config]
    #[arg(long, short = 'o', env = "TASKDECK_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto, or `defaults.color` from config]
    #[arg(long, env = "TASKDECK_COLOR", global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "TASKDECK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "TASKDECK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Maximum simultaneous enrichment requests
    #[arg(long, env = "TASKDECK_CONCURRENCY", global = true)]
    pub concurrency: Option<usize>,
}

impl GlobalOpts {
    pub fn format(&self) -> OutputFormat {
        self.output.clone().unwrap_or(OutputFormat::Table)
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.clone().unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage todo items
    #[command(alias = "todo", alias = "t")]
    Todos(TodosArgs),

    /// Upload a resume and improve its highlights
    #[command(alias = "r")]
    Resume(ResumeArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Todos ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TodosArgs {
    #[command(subcommand)]
    pub command: TodosCommand,
}

#[derive(Debug, Subcommand)]
pub enum TodosCommand {
    /// List all todos in server order
    #[command(alias = "ls")]
    List,

    /// Add a todo
    Add {
        /// Todo text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Replace the text of a todo
    Update {
        /// Todo ID
        id: String,

        /// New text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Delete a todo
    #[command(alias = "rm")]
    Delete {
        /// Todo ID
        id: String,
    },
}

// ── Resume ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ResumeArgs {
    #[command(subcommand)]
    pub command: ResumeCommand,
}

#[derive(Debug, Subcommand)]
pub enum ResumeCommand {
    /// Upload a resume and list the positions found in it
    Upload {
        /// Resume file (PDF, DOCX, TXT)
        file: PathBuf,
    },

    /// Upload a resume and request improved wording for its highlights
    Improve {
        /// Resume file (PDF, DOCX, TXT)
        file: PathBuf,

        /// Only improve this position (1-based, as listed by `upload`)
        #[arg(long, short = 'n')]
        position: Option<usize>,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create an initial config file
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
