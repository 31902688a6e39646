//! Skeleton Generation Pipeline
//!
//! Scanner → worker pool (extractors) → aggregator → assembler.
//!
//! ```rust,ignore
//! use code_skeleton::{ResolutionLevel, SkeletonGenerator, SymlinkPolicy};
//!
//! let skeleton = SkeletonGenerator::new(["src"])
//!     .with_exclude(["excluded"])
//!     .with_symlinks(SymlinkPolicy::Forbid)
//!     .with_workers(4)
//!     .generate(ResolutionLevel::Modules)?;
//! ```

pub mod aggregate;
pub mod assemble;
pub mod pool;

pub use assemble::SkeletonAssembler;
pub use pool::{PoolResults, WorkerPool};

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::analyzer::parser::ExtractorRegistry;
use crate::analyzer::scanner::{ExcludeMatcher, FileScanner, ScannedFile, SourceRoots, SymlinkPolicy};
use crate::constants::scan::{DEFAULT_EXCLUDES, DEFAULT_MAX_FILE_SIZE};
use crate::types::{ModuleInfo, ResolutionLevel, Result, SkeletonError, SkeletonMetadata, Skeleton};

/// Builds a [`Skeleton`] from one or more source roots
#[derive(Debug, Clone)]
pub struct SkeletonGenerator {
    sources: Vec<PathBuf>,
    exclude: Vec<String>,
    symlinks: SymlinkPolicy,
    workers: usize,
    gitignore: bool,
    max_file_size: u64,
    timestamp: Option<DateTime<Utc>>,
    registry: Option<ExtractorRegistry>,
}

impl SkeletonGenerator {
    pub fn new<I, P>(sources: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            exclude: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            symlinks: SymlinkPolicy::default(),
            workers: 0,
            gitignore: false,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            timestamp: None,
            registry: None,
        }
    }

    /// Replace the exclude list (the defaults are dropped)
    pub fn with_exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_symlinks(mut self, policy: SymlinkPolicy) -> Self {
        self.symlinks = policy;
        self
    }

    /// Number of extraction workers; `0` extracts on the calling thread
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_gitignore(mut self, enabled: bool) -> Self {
        self.gitignore = enabled;
        self
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Fix the generation timestamp for reproducible output
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_registry(mut self, registry: ExtractorRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Scan, extract and assemble.
    ///
    /// Configuration problems abort before any file is read; per-file
    /// extraction failures end up in [`Skeleton::skipped`].
    #[instrument(skip(self), fields(sources = self.sources.len(), workers = self.workers))]
    pub fn generate(&self, level: ResolutionLevel) -> Result<Skeleton> {
        let pool = WorkerPool::new(self.workers)?;
        let exclude = ExcludeMatcher::new(&self.exclude)?;
        let roots = SourceRoots::resolve(self.sources.as_slice(), self.symlinks)?;

        let registry = match &self.registry {
            Some(registry) => registry.clone(),
            None => ExtractorRegistry::with_defaults()?,
        };
        if registry.is_empty() {
            return Err(SkeletonError::Config(
                "No extractors registered".to_string(),
            ));
        }

        let scanned = FileScanner::new(roots.clone())
            .with_exclude(exclude)
            .with_symlinks(self.symlinks)
            .with_extensions(registry.extensions())
            .with_gitignore(self.gitignore)
            .with_max_file_size(self.max_file_size)
            .scan()?;

        info!(
            "Extracting {} files from {} source roots at level {} ({} skipped while scanning)",
            scanned.files.len(),
            roots.len(),
            level,
            scanned.skipped.len()
        );

        let extractors = registry.clone();
        let results = pool.run(scanned.files, move |file| extract_file(&extractors, file))?;

        let metadata = SkeletonMetadata::new(
            roots.into_vec(),
            level,
            self.timestamp.unwrap_or_else(Utc::now),
        );
        let skeleton = SkeletonAssembler::new(metadata)
            .with_skipped(scanned.skipped)
            .assemble(results);

        info!(
            "Generated skeleton: {} modules, {} skipped",
            skeleton.modules().len(),
            skeleton.skipped().len()
        );
        Ok(skeleton)
    }
}

/// Read and extract one scanned file
pub fn extract_file(registry: &ExtractorRegistry, file: &ScannedFile) -> Result<ModuleInfo> {
    let extractor = registry.for_path(&file.path).ok_or_else(|| {
        SkeletonError::parse(&file.relative, "no extractor registered for this file type")
    })?;

    let bytes = std::fs::read(&file.path)
        .map_err(|e| SkeletonError::parse(&file.relative, format!("unreadable: {}", e)))?;
    let content = String::from_utf8(bytes)
        .map_err(|_| SkeletonError::parse(&file.relative, "file is not valid UTF-8"))?;

    let parsed = extractor.extract(&file.relative, &content)?;

    Ok(ModuleInfo::new(file.relative.clone(), file.source, extractor.language())
        .with_symbols(parsed.symbols))
}
