//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use taskdeck_config::ConfigError;
use taskdeck_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the taskdeck server")]
    #[diagnostic(
        code(taskdeck::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             Reason: {reason}\n\
             Override the URL with --server or TASKDECK_SERVER."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(taskdeck::timeout),
        help("Increase the timeout with --timeout or check server responsiveness.\n{reason}")
    )]
    Timeout { reason: String },

    // ── Server responses ─────────────────────────────────────────────
    #[error("Not found: {message}")]
    #[diagnostic(
        code(taskdeck::not_found),
        help("Run: taskdeck {list_command} to see what exists")
    )]
    NotFound {
        message: String,
        list_command: String,
    },

    #[error("Server rejected the request (HTTP {status}): {message}")]
    #[diagnostic(code(taskdeck::api_error))]
    ApiError { status: u16, message: String },

    #[error("Unexpected response from server: {message}")]
    #[diagnostic(
        code(taskdeck::malformed_response),
        help("The server answered with a body this client does not understand.")
    )]
    MalformedResponse { message: String },

    #[error("{failed} of {total} position(s) could not be improved")]
    #[diagnostic(
        code(taskdeck::enrichment_failed),
        help("Re-run the command; successful suggestions above are unaffected.")
    )]
    EnrichmentFailed { failed: usize, total: usize },

    // ── Local state ──────────────────────────────────────────────────
    #[error("Already improving '{parent}'")]
    #[diagnostic(code(taskdeck::in_progress))]
    InProgress { parent: String },

    #[error("Operation cancelled")]
    #[diagnostic(code(taskdeck::cancelled))]
    Cancelled,

    #[error("Could not read resume: {message}")]
    #[diagnostic(code(taskdeck::document))]
    Document { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(taskdeck::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(taskdeck::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: taskdeck config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(taskdeck::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(taskdeck::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / internal ────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(taskdeck::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::InProgress { .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::Document { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Network { reason } => CliError::ConnectionFailed { reason },
            CoreError::Timeout { reason } => CliError::Timeout { reason },
            CoreError::Server {
                status: 404,
                message,
            } => CliError::NotFound {
                message,
                list_command: "todos list".into(),
            },
            CoreError::Server { status, message } => CliError::ApiError { status, message },
            CoreError::Parse { message } => CliError::MalformedResponse { message },
            CoreError::EnrichmentInProgress { parent } => CliError::InProgress { parent },
            CoreError::Cancelled => CliError::Cancelled,
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Io { message } => CliError::Document { message },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            other => CliError::Config(Box::new(other)),
        }
    }
}
