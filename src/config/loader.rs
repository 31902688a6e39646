//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/code-skeleton/config.toml)
//! 3. Project config (.code-skeleton.toml)
//! 4. Environment variables (CODE_SKELETON_* prefix, `__` separates sections)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::constants::config::{APP_DIR, ENV_PREFIX, GLOBAL_FILE, PROJECT_FILE};
use crate::types::{Result, SkeletonError};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let figment = Self::layered(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
        )
        // e.g. CODE_SKELETON_SCAN__WORKERS -> scan.workers
        .merge(Self::env_provider());

        Self::extract(figment)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(SkeletonError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        Self::extract(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::file(path)),
        )
    }

    fn layered(global: Option<&Path>, project: &Path) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        figment
    }

    fn env_provider() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .map_err(|e| SkeletonError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/code-skeleton/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join(APP_DIR))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join(GLOBAL_FILE))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(PROJECT_FILE)
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Render the effective configuration as JSON or TOML
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| SkeletonError::Config(e.to_string()))
        }
    }

    /// Show current effective configuration
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;
        println!("{}", Self::render(&config, as_json)?);
        Ok(())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            SkeletonError::Config("Cannot determine global config directory".to_string())
        })?;

        fs::create_dir_all(&global_dir)?;
        Self::write_default(&global_dir.join(GLOBAL_FILE), force)
    }

    /// Initialize project configuration in the current directory
    pub fn init_project(force: bool) -> Result<PathBuf> {
        Self::write_default(&Self::project_config_path(), force)
    }

    fn write_default(path: &Path, force: bool) -> Result<PathBuf> {
        if path.exists() && !force {
            info!("Config exists: {}", path.display());
        } else {
            fs::write(path, Self::default_config())?;
            info!("Created config: {}", path.display());
        }
        Ok(path.to_path_buf())
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Generate default config content (TOML)
    fn default_config() -> String {
        r#"# code-skeleton configuration
# Project settings in .code-skeleton.toml override the global file.
# Environment variables override both, e.g. CODE_SKELETON_SCAN__WORKERS=8

version = "1.0"

[scan]
sources = ["."]
# Directory names, path prefixes or glob patterns
exclude = [".git", ".venv", "venv", "__pycache__", "node_modules", "target", "build", "dist", ".skeleton"]
# forbid | follow | skip
symlinks = "forbid"
# 0 extracts sequentially
workers = 4
gitignore = false
max_file_size = 1048576

[output]
dir = ".skeleton"
# packages | modules | classes | functions
level = "modules"
formats = ["json"]
# split | embedded
layout = "split"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::scanner::SymlinkPolicy;
    use crate::formats::{Layout, OutputFormat};
    use crate::types::ResolutionLevel;
    use tempfile::TempDir;

    #[test]
    fn test_layered_defaults_without_files() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigLoader::extract(ConfigLoader::layered(
            None,
            &temp_dir.path().join(PROJECT_FILE),
        ))
        .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_project_overrides_global() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        let project = temp_dir.path().join(PROJECT_FILE);
        fs::write(
            &global,
            "[scan]\nworkers = 2\nsymlinks = \"skip\"\n[output]\nlevel = \"classes\"\n",
        )
        .unwrap();
        fs::write(&project, "[scan]\nworkers = 8\n").unwrap();

        let config =
            ConfigLoader::extract(ConfigLoader::layered(Some(&global), &project)).unwrap();
        assert_eq!(config.scan.workers, 8);
        assert_eq!(config.scan.symlinks, SymlinkPolicy::Skip);
        assert_eq!(config.output.level, ResolutionLevel::Classes);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join(PROJECT_FILE);
        fs::write(&project, "[scan]\nworkers = 100000\n").unwrap();
        let err = ConfigLoader::extract(ConfigLoader::layered(None, &project)).unwrap_err();
        assert!(matches!(err, SkeletonError::Config(_)));

        fs::write(&project, "[output]\nlevel = \"everything\"\n").unwrap();
        let err = ConfigLoader::extract(ConfigLoader::layered(None, &project)).unwrap_err();
        assert!(matches!(err, SkeletonError::Config(_)));
    }

    #[test]
    fn test_env_override() {
        let temp_dir = TempDir::new().unwrap();
        // SAFETY: no other test reads this variable
        unsafe {
            env::set_var("CODE_SKELETON_OUTPUT__LAYOUT", "embedded");
        }
        let figment = ConfigLoader::layered(None, &temp_dir.path().join(PROJECT_FILE))
            .merge(ConfigLoader::env_provider());
        let config = ConfigLoader::extract(figment);
        unsafe {
            env::remove_var("CODE_SKELETON_OUTPUT__LAYOUT");
        }
        assert_eq!(config.unwrap().output.layout, Layout::Embedded);
    }

    #[test]
    fn test_default_config_file_parses() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        ConfigLoader::write_default(&path, false).unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.output.formats, vec![OutputFormat::Json]);
        assert_eq!(config.scan.workers, 4);
        assert_eq!(config.output.layout, Layout::Split);
    }

    #[test]
    fn test_write_default_respects_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "version = \"custom\"\n").unwrap();

        ConfigLoader::write_default(&path, false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "version = \"custom\"\n");

        ConfigLoader::write_default(&path, true).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("[scan]"));
    }

    #[test]
    fn test_load_from_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(ConfigLoader::load_from_file(&temp_dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn test_render_formats() {
        let config = Config::default();
        let toml_text = ConfigLoader::render(&config, false).unwrap();
        assert!(toml_text.contains("[scan]"));
        let json_text = ConfigLoader::render(&config, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json_text).unwrap();
        assert_eq!(value["output"]["level"], "modules");
    }
}
