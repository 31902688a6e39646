use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Layout, OutputFormat};
use crate::types::{ExtractionFailure, ResolutionLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Schema,
    Hierarchy,
    Package,
}

/// One file written by a generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path relative to the output directory, forward slashes
    pub path: String,
    pub kind: DocumentKind,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFormat {
    pub format: OutputFormat,
    pub error: String,
}

/// Index of a generation run's output.
///
/// Lists every file written except the manifest itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub level: ResolutionLevel,
    pub layout: Layout,
    pub files: Vec<ManifestEntry>,
    pub skipped: Vec<ExtractionFailure>,
    pub failed_formats: Vec<FailedFormat>,
}

impl Manifest {
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|f| f.path == path)
    }

    pub fn files_of(&self, kind: DocumentKind) -> impl Iterator<Item = &ManifestEntry> {
        self.files.iter().filter(move |f| f.kind == kind)
    }

    pub fn is_complete(&self) -> bool {
        self.failed_formats.is_empty()
    }
}
