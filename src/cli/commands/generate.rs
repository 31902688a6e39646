//! Generate Command
//!
//! Scan source roots, extract structure and write the skeleton documents.
//!
//! Usage:
//!   code-skeleton generate [SOURCES]... [-o DIR] [-l LEVEL] [-f FORMAT]...
//!
//! Command-line flags override the merged configuration.

use std::path::PathBuf;

use tracing::info;

use crate::analyzer::scanner::SymlinkPolicy;
use crate::cli::ui::Output;
use crate::config::{Config, ConfigLoader};
use crate::formats::{DocumentKind, Layout, Manifest, OutputFormat, SkeletonWriter};
use crate::generator::SkeletonGenerator;
use crate::types::{ResolutionLevel, Result};

/// Command-line overrides for a generation run
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub sources: Vec<PathBuf>,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub level: Option<ResolutionLevel>,
    pub formats: Vec<OutputFormat>,
    pub layout: Option<Layout>,
    pub exclude: Vec<String>,
    pub symlinks: Option<SymlinkPolicy>,
    pub workers: Option<usize>,
    pub gitignore: bool,
}

impl GenerateOptions {
    /// Fold the flags into `config`; list flags replace, never append
    pub fn apply(&self, mut config: Config) -> Result<Config> {
        if !self.sources.is_empty() {
            config.scan.sources = self.sources.clone();
        }
        if !self.exclude.is_empty() {
            config.scan.exclude = self.exclude.clone();
        }
        if let Some(symlinks) = self.symlinks {
            config.scan.symlinks = symlinks;
        }
        if let Some(workers) = self.workers {
            config.scan.workers = workers;
        }
        if self.gitignore {
            config.scan.gitignore = true;
        }
        if let Some(output) = &self.output {
            config.output.dir = output.clone();
        }
        if let Some(level) = self.level {
            config.output.level = level;
        }
        if !self.formats.is_empty() {
            config.output.formats = self.formats.clone();
        }
        if let Some(layout) = self.layout {
            config.output.layout = layout;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Build the skeleton for `config` and write it
pub fn execute(config: &Config) -> Result<Manifest> {
    let skeleton = SkeletonGenerator::new(config.scan.sources.iter().cloned())
        .with_exclude(config.scan.exclude.iter().cloned())
        .with_symlinks(config.scan.symlinks)
        .with_workers(config.scan.workers)
        .with_gitignore(config.scan.gitignore)
        .with_max_file_size(config.scan.max_file_size)
        .generate(config.output.level)?;

    info!(
        modules = skeleton.modules().len(),
        skipped = skeleton.skipped().len(),
        "Skeleton assembled"
    );

    SkeletonWriter::new(&config.output.dir)
        .with_layout(config.output.layout)
        .write(&skeleton, &config.output.formats)
}

pub fn run(options: GenerateOptions) -> Result<()> {
    let base = match &options.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let config = options.apply(base)?;
    let manifest = execute(&config)?;

    print_summary(&config, &manifest);
    Ok(())
}

fn print_summary(config: &Config, manifest: &Manifest) {
    let out = Output::new();

    out.header("Skeleton generated");
    out.kv("Output", &config.output.dir.display().to_string());
    out.kv("Level", manifest.level.as_str());
    out.kv("Layout", manifest.layout.as_str());
    out.kv(
        "Documents",
        &format!(
            "{} hierarchy, {} package, {} schema",
            manifest.files_of(DocumentKind::Hierarchy).count(),
            manifest.files_of(DocumentKind::Package).count(),
            manifest.files_of(DocumentKind::Schema).count(),
        ),
    );

    if manifest.skipped.is_empty() {
        out.success("All files extracted");
    } else {
        out.warning(&format!("{} file(s) skipped", manifest.skipped.len()));
        for failure in &manifest.skipped {
            out.item(&format!("{}: {}", failure.path, failure.reason));
        }
    }

    for failed in &manifest.failed_formats {
        out.error(&format!("{} output failed: {}", failed.format, failed.error));
    }
}
