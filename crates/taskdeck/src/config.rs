//! CLI configuration: thin wrapper around `taskdeck_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--server, --timeout, --concurrency, --insecure).

use taskdeck_core::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use taskdeck_config::{Config, config_path, load_config, profile_to_client_config, save_config};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `ClientConfig` from the selected profile plus flag overrides.
///
/// Without any profile the built-in defaults apply, so a bare
/// `taskdeck todos list` talks to `http://localhost:8000`.
pub fn resolve_client_config(global: &GlobalOpts, config: &Config) -> Result<ClientConfig, CliError> {
    let selected = config
        .select_profile(global.profile.as_deref())
        .map_err(|_| CliError::ProfileNotFound {
            name: active_profile_name(global, config),
            available: available_profiles(config),
        })?;

    let mut profile = selected.map(|(_, p)| p.clone()).unwrap_or_default();

    // Flags (and their env vars) beat profile values.
    if let Some(ref server) = global.server {
        profile.server.clone_from(server);
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }
    if global.concurrency.is_some() {
        profile.concurrency = global.concurrency;
    }
    if global.insecure {
        profile.insecure = Some(true);
    }

    let client = profile_to_client_config(&profile, &config.defaults)?;
    tracing::debug!(
        server = %client.server,
        timeout_secs = client.timeout.as_secs(),
        concurrency = client.max_concurrent_enrichments,
        "resolved client config"
    );
    Ok(client)
}

fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        return "(none)".into();
    }
    config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["taskdeck"];
        argv.extend_from_slice(args);
        argv.push("config");
        argv.push("path");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn flags_override_profile() {
        let mut cfg = Config::starter("http://profile.example:8000");
        cfg.profiles.get_mut("default").unwrap().timeout = Some(99);

        let client = resolve_client_config(
            &global(&["--server", "http://flag.example:9000", "--concurrency", "3"]),
            &cfg,
        )
        .unwrap();

        assert_eq!(client.server.as_str(), "http://flag.example:9000/");
        assert_eq!(client.timeout.as_secs(), 99);
        assert_eq!(client.max_concurrent_enrichments, 3);
    }

    #[test]
    fn no_profile_falls_back_to_localhost() {
        let client = resolve_client_config(&global(&[]), &Config::default()).unwrap();
        assert_eq!(client.server.as_str(), "http://localhost:8000/");
    }

    #[test]
    fn unknown_profile_lists_available() {
        let cfg = Config::starter("http://localhost:8000");
        let err = resolve_client_config(&global(&["--profile", "work"]), &cfg).unwrap_err();
        match err {
            CliError::ProfileNotFound { name, available } => {
                assert_eq!(name, "work");
                assert_eq!(available, "default");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
