//! Config subcommands handler

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use tally::Config;

use super::load_config;

/// Show the effective configuration as TOML.
#[cfg(not(tarpaulin_include))]
pub fn handle_show(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    println!("{}", render(&config)?);
    Ok(())
}

/// Print where the configuration is read from.
#[cfg(not(tarpaulin_include))]
pub fn handle_path(config_path: Option<&Path>) -> Result<()> {
    println!("{}", resolve_path(config_path)?.display());
    Ok(())
}

pub(crate) fn render(config: &Config) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize config")
}

fn resolve_path(config_path: Option<&Path>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::config_path(),
    }
}
