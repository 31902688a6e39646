//! Unified Error Type System
//!
//! Centralized error type for the whole generation pipeline.
//! Every error carries a category that decides how far it propagates.
//!
//! ## Error Categories
//!
//! - **Configuration**: invalid level, missing source root, forbidden symlink (abort the run)
//! - **Extraction**: a single file could not be read or parsed (recorded, run continues)
//! - **Write**: an output document could not be written (fails that format only)
//! - **Io / Serialization**: low-level failures, classified by where they surface

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories used to route failures through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad configuration - fail fast before any output is written
    Configuration,
    /// Per-file extraction problem - record and continue
    Extraction,
    /// Output could not be written - isolate to the affected format
    Write,
    /// Raw filesystem failure
    Io,
    /// Serializer failure
    Serialization,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Extraction => write!(f, "EXTRACTION"),
            Self::Write => write!(f, "WRITE"),
            Self::Io => write!(f, "IO"),
            Self::Serialization => write!(f, "SERIALIZATION"),
        }
    }
}

impl ErrorCategory {
    /// Whether an error of this category must abort the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration | Self::Io)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum SkeletonError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid resolution level '{0}'. Valid values: packages, modules, classes, functions")]
    InvalidLevel(String),

    #[error("Source root does not exist: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Symlink encountered under FORBID policy: {}", path.display())]
    SymlinkForbidden { path: PathBuf },

    // -------------------------------------------------------------------------
    // Extraction Errors
    // -------------------------------------------------------------------------
    #[error("Parse error in {path}: {message}")]
    Parse { message: String, path: String },

    // -------------------------------------------------------------------------
    // Write Errors
    // -------------------------------------------------------------------------
    #[error("Failed to write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error("Output path collision: {}", path.display())]
    PathCollision { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, SkeletonError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl SkeletonError {
    /// Create a parse error for a file
    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Classify this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_)
            | Self::InvalidLevel(_)
            | Self::SourceNotFound { .. }
            | Self::SymlinkForbidden { .. } => ErrorCategory::Configuration,
            Self::Parse { .. } => ErrorCategory::Extraction,
            Self::Write { .. } | Self::PathCollision { .. } => ErrorCategory::Write,
            Self::Io(_) => ErrorCategory::Io,
            Self::Json(_) | Self::Yaml(_) => ErrorCategory::Serialization,
        }
    }

    /// Check if this is a configuration-time error
    pub fn is_configuration(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }
}

/// Context extension trait for attaching an output path to errors
pub trait ResultExt<T> {
    /// Convert the error into a `Write` error for `path`
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| SkeletonError::Write {
            path: path.into(),
            message: e.to_string(),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Configuration.to_string(), "CONFIGURATION");
        assert_eq!(ErrorCategory::Extraction.to_string(), "EXTRACTION");
        assert_eq!(ErrorCategory::Write.to_string(), "WRITE");
    }

    #[test]
    fn test_category_routing() {
        let err = SkeletonError::SymlinkForbidden {
            path: PathBuf::from("/tmp/link"),
        };
        assert!(err.is_configuration());
        assert!(err.category().is_fatal());

        let err = SkeletonError::parse("pkg/mod.py", "syntax error");
        assert_eq!(err.category(), ErrorCategory::Extraction);
        assert!(!err.category().is_fatal());

        let err = SkeletonError::PathCollision {
            path: PathBuf::from("modules/a.json"),
        };
        assert_eq!(err.category(), ErrorCategory::Write);
        assert!(!err.category().is_fatal());
    }

    #[test]
    fn test_parse_error_display() {
        let err = SkeletonError::parse("pkg/mod.py", "unexpected token");
        assert_eq!(err.to_string(), "Parse error in pkg/mod.py: unexpected token");
    }

    #[test]
    fn test_with_path() {
        let io: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::other("disk full"));
        let err = io.with_path("out/hierarchy.json").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Write);
        assert!(err.to_string().contains("out/hierarchy.json"));
        assert!(err.to_string().contains("disk full"));
    }
}
