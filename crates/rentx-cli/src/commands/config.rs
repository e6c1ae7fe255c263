use std::path::Path;

use rentx_core::util::{is_http_url, normalize_text_option};
use rentx_core::ClientConfig;

use crate::cli::ConfigCommands;
use crate::commands::common::load_config;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, config_path: &Path) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => {
            let config = load_config(config_path)?;
            for line in format_config_lines(&config, config_path) {
                println!("{line}");
            }
            Ok(())
        }
        ConfigCommands::Set {
            api_url,
            timeout,
            probe_interval,
            sync_on_start,
            access_token,
        } => {
            let updates = ConfigUpdates {
                api_url,
                timeout,
                probe_interval,
                sync_on_start,
                access_token,
            };
            run_config_set(config_path, updates)?;
            println!("Saved config to {}", config_path.display());
            Ok(())
        }
    }
}

#[derive(Debug, Default)]
pub struct ConfigUpdates {
    pub api_url: Option<String>,
    pub timeout: Option<u64>,
    pub probe_interval: Option<u64>,
    pub sync_on_start: Option<bool>,
    pub access_token: Option<String>,
}

/// Merge `updates` into the file at `config_path`
///
/// Env overrides are not applied; they must never end up in the file.
pub fn run_config_set(config_path: &Path, updates: ConfigUpdates) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::load_from_path(config_path)
        .map_err(|error| CliError::Config(error.to_string()))?;

    if let Some(url) = normalize_text_option(updates.api_url) {
        if !is_http_url(&url) {
            return Err(CliError::Config(format!(
                "API URL must include http:// or https://: {url}"
            )));
        }
        config.api_base_url = Some(url);
    }
    if let Some(timeout) = updates.timeout {
        config.request_timeout_secs = timeout;
    }
    if let Some(interval) = updates.probe_interval {
        config.probe_interval_secs = interval;
    }
    if let Some(sync_on_start) = updates.sync_on_start {
        config.sync_on_start = sync_on_start;
    }
    if let Some(token) = updates.access_token {
        config.access_token = normalize_text_option(Some(token));
    }

    config
        .save_to_path(config_path)
        .map_err(|error| CliError::Config(error.to_string()))?;
    ClientConfig::load_from_path(config_path).map_err(|error| CliError::Config(error.to_string()))
}

pub fn format_config_lines(config: &ClientConfig, config_path: &Path) -> Vec<String> {
    vec![
        format!("Config file: {}", config_path.display()),
        format!(
            "api_base_url: {}",
            config.api_base_url.as_deref().unwrap_or("(not set)")
        ),
        format!("request_timeout_secs: {}", config.request_timeout_secs),
        format!("probe_interval_secs: {}", config.probe_interval_secs),
        format!("sync_on_start: {}", config.sync_on_start),
        format!(
            "db_path: {}",
            config
                .db_path
                .as_ref()
                .map_or_else(|| "(default)".to_string(), |path| path.display().to_string())
        ),
        format!(
            "access_token: {}",
            if config.access_token().is_some() {
                "[REDACTED]"
            } else {
                "(not set)"
            }
        ),
    ]
}
