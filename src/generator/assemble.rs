use tracing::debug;

use super::aggregate;
use super::pool::PoolResults;
use crate::types::{ExtractionFailure, ModuleInfo, Skeleton, SkeletonMetadata};

/// Turns pool outcomes into an immutable [`Skeleton`].
///
/// Outcomes are re-sorted by `(source, path)` first, so the result does not
/// depend on the order in which workers finished.
pub struct SkeletonAssembler {
    metadata: SkeletonMetadata,
    skipped: Vec<ExtractionFailure>,
}

impl SkeletonAssembler {
    pub fn new(metadata: SkeletonMetadata) -> Self {
        Self {
            metadata,
            skipped: Vec::new(),
        }
    }

    /// Files dropped before extraction (oversized, unreadable)
    pub fn with_skipped(mut self, skipped: Vec<ExtractionFailure>) -> Self {
        self.skipped = skipped;
        self
    }

    pub fn assemble(self, results: PoolResults) -> Skeleton {
        let mut modules: Vec<ModuleInfo> = Vec::new();
        let mut skipped = self.skipped;

        for outcome in results.into_values() {
            match outcome {
                Ok(module) => modules.push(module),
                Err(failure) => skipped.push(failure),
            }
        }

        modules.sort_by(|a, b| (a.source, &a.path).cmp(&(b.source, &b.path)));
        skipped.sort();

        debug!(
            "Assembling {} modules ({} skipped) at level {}",
            modules.len(),
            skipped.len(),
            self.metadata.level
        );

        let full = aggregate::build_tree(modules);
        let hierarchy = aggregate::project(&full, self.metadata.level);

        Skeleton::new(self.metadata, hierarchy, skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::parser::Language;
    use crate::types::ResolutionLevel;
    use chrono::DateTime;
    use std::path::PathBuf;

    fn metadata(level: ResolutionLevel) -> SkeletonMetadata {
        SkeletonMetadata::new(
            vec![PathBuf::from("/a"), PathBuf::from("/b")],
            level,
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        )
    }

    fn results() -> PoolResults {
        let mut results = PoolResults::new();
        // Keys deliberately disagree with (source, path) order
        results.insert(
            PathBuf::from("/0"),
            Ok(ModuleInfo::new("pkg/x.py", 1, Language::Python)),
        );
        results.insert(
            PathBuf::from("/1"),
            Ok(ModuleInfo::new("pkg/x.py", 0, Language::Python)),
        );
        results.insert(
            PathBuf::from("/2"),
            Err(ExtractionFailure {
                source: 1,
                path: "b.py".into(),
                reason: "bad".into(),
            }),
        );
        results.insert(
            PathBuf::from("/3"),
            Err(ExtractionFailure {
                source: 0,
                path: "z.py".into(),
                reason: "bad".into(),
            }),
        );
        results
    }

    #[test]
    fn test_assemble_sorts_and_collects_failures() {
        let skeleton = SkeletonAssembler::new(metadata(ResolutionLevel::Modules)).assemble(results());

        // Same relative path under both roots: both modules survive
        let pkg = skeleton.hierarchy()["pkg"].as_package().unwrap();
        assert_eq!(pkg.children["x.py@0"].as_module().unwrap().source, 0);
        assert_eq!(pkg.children["x.py@1"].as_module().unwrap().source, 1);
        assert_eq!(skeleton.modules().len(), 2);

        let skipped: Vec<(usize, &str)> = skeleton
            .skipped()
            .iter()
            .map(|f| (f.source, f.path.as_str()))
            .collect();
        assert_eq!(skipped, vec![(0, "z.py"), (1, "b.py")]);
        assert!(skeleton.validate().is_ok());
    }

    #[test]
    fn test_scan_failures_merged_into_skipped() {
        let skeleton = SkeletonAssembler::new(metadata(ResolutionLevel::Modules))
            .with_skipped(vec![ExtractionFailure {
                source: 0,
                path: "big.py".into(),
                reason: "file size 600 bytes exceeds limit of 64".into(),
            }])
            .assemble(results());

        let skipped: Vec<(usize, &str)> = skeleton
            .skipped()
            .iter()
            .map(|f| (f.source, f.path.as_str()))
            .collect();
        assert_eq!(skipped, vec![(0, "big.py"), (0, "z.py"), (1, "b.py")]);
    }

    #[test]
    fn test_assemble_projects_to_level() {
        let skeleton =
            SkeletonAssembler::new(metadata(ResolutionLevel::Packages)).assemble(results());
        let pkg = skeleton.hierarchy()["pkg"].as_package().unwrap();
        assert!(pkg.children.is_empty());
        assert_eq!(pkg.summary.map(|s| s.modules), Some(2));
        assert!(skeleton.modules().is_empty());
    }
}
