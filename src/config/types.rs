//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (`~/.config/code-skeleton/`) and project (`.code-skeleton.toml`)
//! level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::analyzer::scanner::SymlinkPolicy;
use crate::constants::{output, pool, scan};
use crate::formats::{Layout, OutputFormat};
use crate::types::{ResolutionLevel, Result, SkeletonError};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Source scanning settings
    pub scan: ScanConfig,

    /// Output settings
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            scan: ScanConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `SkeletonError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.scan.sources.is_empty() {
            return Err(SkeletonError::Config(
                "scan.sources must list at least one source root".to_string(),
            ));
        }

        if self.scan.workers > pool::MAX_WORKERS {
            return Err(SkeletonError::Config(format!(
                "scan.workers must be at most {}, got {}",
                pool::MAX_WORKERS,
                self.scan.workers
            )));
        }

        if self.scan.max_file_size == 0 {
            return Err(SkeletonError::Config(
                "scan.max_file_size must be greater than 0".to_string(),
            ));
        }

        if self.output.formats.is_empty() {
            return Err(SkeletonError::Config(
                "output.formats must list at least one format".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Scan Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Source roots, relative to the working directory or absolute
    pub sources: Vec<PathBuf>,

    /// Exclude patterns (segment names, path prefixes or globs)
    pub exclude: Vec<String>,

    /// Symlink handling
    pub symlinks: SymlinkPolicy,

    /// Extraction workers; 0 runs sequentially
    pub workers: usize,

    /// Honour `.gitignore` in each source root
    pub gitignore: bool,

    /// Files larger than this many bytes are skipped
    pub max_file_size: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            sources: vec![PathBuf::from(".")],
            exclude: scan::DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            symlinks: SymlinkPolicy::default(),
            workers: pool::DEFAULT_WORKERS,
            gitignore: false,
            max_file_size: scan::DEFAULT_MAX_FILE_SIZE,
        }
    }
}

// =============================================================================
// Output Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory
    pub dir: PathBuf,

    /// Resolution level
    pub level: ResolutionLevel,

    /// Formats written in one run
    pub formats: Vec<OutputFormat>,

    /// Split per-package documents or embed everything in the hierarchy
    pub layout: Layout,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(output::DEFAULT_DIR),
            level: ResolutionLevel::default(),
            formats: vec![OutputFormat::Json],
            layout: Layout::default(),
        }
    }
}
