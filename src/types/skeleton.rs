use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use super::error::{Result, SkeletonError};
use super::level::ResolutionLevel;
use super::symbol::{Hierarchy, ModuleInfo, Node};

/// Run-level facts shared by every document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonMetadata {
    /// Canonical source roots in first-encounter order; modules refer to them by index
    pub sources: Vec<PathBuf>,
    pub level: ResolutionLevel,
    pub generated_at: DateTime<Utc>,
    pub version: String,
}

impl SkeletonMetadata {
    pub fn new(sources: Vec<PathBuf>, level: ResolutionLevel, generated_at: DateTime<Utc>) -> Self {
        Self {
            sources,
            level,
            generated_at,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// A file the extractor could not handle
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExtractionFailure {
    /// Index into `metadata.sources`
    pub source: usize,
    /// Path relative to the source root
    pub path: String,
    pub reason: String,
}

/// Assembled structural description of a source tree.
///
/// Built once per generation run; only read accessors are exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skeleton {
    metadata: SkeletonMetadata,
    hierarchy: Hierarchy,
    skipped: Vec<ExtractionFailure>,
}

impl Skeleton {
    pub(crate) fn new(
        metadata: SkeletonMetadata,
        hierarchy: Hierarchy,
        skipped: Vec<ExtractionFailure>,
    ) -> Self {
        Self {
            metadata,
            hierarchy,
            skipped,
        }
    }

    pub fn metadata(&self) -> &SkeletonMetadata {
        &self.metadata
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn level(&self) -> ResolutionLevel {
        self.metadata.level
    }

    /// Files that failed extraction, sorted by source then path
    pub fn skipped(&self) -> &[ExtractionFailure] {
        &self.skipped
    }

    /// Every module in the hierarchy, depth-first in key order
    pub fn modules(&self) -> Vec<&ModuleInfo> {
        let mut modules = Vec::new();
        collect_modules(&self.hierarchy, &mut modules);
        modules
    }

    /// Check the source-index and source-uniqueness invariants
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for source in &self.metadata.sources {
            if !seen.insert(source) {
                return Err(SkeletonError::Config(format!(
                    "Duplicate source root in metadata: {}",
                    source.display()
                )));
            }
        }

        let count = self.metadata.sources.len();
        for module in self.modules() {
            if module.source >= count {
                return Err(SkeletonError::Config(format!(
                    "Module {} refers to source index {} but only {} sources exist",
                    module.path, module.source, count
                )));
            }
        }
        for failure in &self.skipped {
            if failure.source >= count {
                return Err(SkeletonError::Config(format!(
                    "Skipped file {} refers to source index {} but only {} sources exist",
                    failure.path, failure.source, count
                )));
            }
        }

        Ok(())
    }
}

fn collect_modules<'a>(nodes: &'a Hierarchy, out: &mut Vec<&'a ModuleInfo>) {
    for node in nodes.values() {
        match node {
            Node::Module(module) => out.push(module),
            Node::Package(package) => collect_modules(&package.children, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::parser::Language;
    use crate::types::PackageInfo;

    fn sample(source: usize) -> Skeleton {
        let mut package = PackageInfo::new("pkg");
        package.children.insert(
            "mod".to_string(),
            Node::Module(ModuleInfo::new("pkg/mod.py", source, Language::Python)),
        );
        let mut hierarchy = Hierarchy::new();
        hierarchy.insert("pkg".to_string(), Node::Package(package));
        hierarchy.insert(
            "setup".to_string(),
            Node::Module(ModuleInfo::new("setup.py", 0, Language::Python)),
        );

        Skeleton::new(
            SkeletonMetadata::new(
                vec![PathBuf::from("/src")],
                ResolutionLevel::Modules,
                DateTime::from_timestamp(0, 0).unwrap(),
            ),
            hierarchy,
            Vec::new(),
        )
    }

    #[test]
    fn test_modules_walks_packages() {
        let skeleton = sample(0);
        let paths: Vec<&str> = skeleton.modules().iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["pkg/mod.py", "setup.py"]);
    }

    #[test]
    fn test_validate_accepts_valid_indices() {
        assert!(sample(0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_dangling_index() {
        let err = sample(3).validate().unwrap_err();
        assert!(err.to_string().contains("source index 3"));
    }

    #[test]
    fn test_metadata_version() {
        let skeleton = sample(0);
        assert_eq!(skeleton.metadata().version, env!("CARGO_PKG_VERSION"));
        assert_eq!(skeleton.level(), ResolutionLevel::Modules);
    }
}
