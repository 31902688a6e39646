//! Config Command
//!
//! Manage code-skeleton configuration.
//!
//! Usage:
//!   code-skeleton config show [-f toml|json]
//!   code-skeleton config path
//!   code-skeleton config init [-g] [--force]

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::{Result, SkeletonError};

/// Show the merged effective configuration
pub fn show(format: &str) -> Result<()> {
    match format {
        "json" => ConfigLoader::show_config(true),
        "toml" => ConfigLoader::show_config(false),
        other => Err(SkeletonError::Config(format!(
            "Invalid format '{}'. Valid values: toml, json",
            other
        ))),
    }
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Write a default config file, globally or in the current directory
pub fn init(global: bool, force: bool) -> Result<()> {
    let path = if global {
        ConfigLoader::init_global(force)?
    } else {
        ConfigLoader::init_project(force)?
    };
    Output::new().success(&format!("Configuration ready: {}", path.display()));
    Ok(())
}
