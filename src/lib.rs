//! code-skeleton - Token-Efficient Codebase Structure Maps
//!
//! Scans Python and Rust source trees and writes a compact structural
//! description of them (packages, modules, classes, functions) as
//! cross-referenced JSON or YAML documents, sized for an AI agent's context.
//!
//! ## Core Features
//!
//! - **Resolution Levels**: packages, modules, classes or functions
//! - **Language Support**: Python and Rust via tree-sitter extractors
//! - **Parallel Extraction**: bounded worker pool with per-file failure isolation
//! - **Split Layout**: one document per top-level package, linked from the hierarchy
//! - **Deterministic Output**: byte-identical documents for a fixed timestamp
//!
//! ## Quick Start
//!
//! ```ignore
//! use code_skeleton::{OutputFormat, ResolutionLevel, SkeletonGenerator, write_skeleton};
//!
//! let skeleton = SkeletonGenerator::new(["src"])
//!     .with_workers(4)
//!     .generate(ResolutionLevel::Classes)?;
//! let manifest = write_skeleton(&skeleton, ".skeleton", &[OutputFormat::Json])?;
//! ```
//!
//! ## Modules
//!
//! - [`analyzer`]: Source scanning and tree-sitter extractors
//! - [`generator`]: Worker pool, aggregation and level projection
//! - [`formats`]: Document rendering, schemas and the manifest
//! - [`config`]: Layered configuration (defaults, files, environment)

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod formats;
pub mod generator;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, OutputConfig, ScanConfig};

// Error Types
pub use types::error::{ErrorCategory, Result, ResultExt, SkeletonError};

// Data Model
pub use types::{
    ExtractionFailure, Hierarchy, ModuleInfo, Node, PackageInfo, ResolutionLevel, Skeleton,
    SkeletonMetadata, Symbol,
};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use generator::{SkeletonGenerator, WorkerPool};

pub use formats::{Layout, Manifest, OutputFormat, SkeletonWriter, write_skeleton};

// =============================================================================
// Analyzer Re-exports
// =============================================================================

pub use analyzer::{
    parser::{Extractor, ExtractorRegistry, Language, ParseResult},
    scanner::{FileScanner, SymlinkPolicy},
};
