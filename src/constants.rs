//! Global Constants
//!
//! Centralized constants for scanning, extraction and output layout.
//! All magic numbers should be defined here with documentation.

/// Source scanner constants
pub mod scan {
    /// Default maximum file size for extraction (1MB)
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

    /// Directory and file names excluded unless the caller overrides the list
    pub const DEFAULT_EXCLUDES: &[&str] = &[
        ".git",
        ".hg",
        ".svn",
        ".venv",
        "venv",
        ".tox",
        ".mypy_cache",
        ".pytest_cache",
        "__pycache__",
        "node_modules",
        "target",
        "build",
        "dist",
        ".skeleton",
    ];
}

/// Worker pool constants
pub mod pool {
    /// Upper bound on concurrent extraction workers
    pub const MAX_WORKERS: usize = 256;

    /// Worker count used by the CLI when the config does not say otherwise
    pub const DEFAULT_WORKERS: usize = 4;
}

/// Output layout constants
pub mod output {
    /// Default output directory, relative to the working directory
    pub const DEFAULT_DIR: &str = ".skeleton";

    /// Manifest file name (always JSON)
    pub const MANIFEST_FILE: &str = "manifest.json";

    /// Directory holding JSON schema documents
    pub const SCHEMAS_DIR: &str = "schemas";

    /// Directory holding per-package documents under split layout
    pub const MODULES_DIR: &str = "modules";

    /// Hierarchy document stem; the extension follows the format
    pub const HIERARCHY_STEM: &str = "hierarchy";

    /// Schema for the hierarchy document
    pub const HIERARCHY_SCHEMA: &str = "hierarchy.schema.json";

    /// Schema for per-package documents
    pub const MODULE_SCHEMA: &str = "module.schema.json";

    /// JSON Schema dialect declared by the schema documents
    pub const SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";
}

/// Configuration file locations
pub mod config {
    /// Project-level configuration file name
    pub const PROJECT_FILE: &str = ".code-skeleton.toml";

    /// Directory under the user config dir
    pub const APP_DIR: &str = "code-skeleton";

    /// Global configuration file name
    pub const GLOBAL_FILE: &str = "config.toml";

    /// Environment variable prefix; nested keys are split on `__`
    pub const ENV_PREFIX: &str = "CODE_SKELETON_";
}
