//! Code Analyzer Module
//!
//! Provides the input side of skeleton generation:
//! - File scanning with exclude, gitignore and symlink policies
//! - Per-language symbol extraction (tree-sitter)

pub mod parser;
pub mod scanner;

pub use parser::{Extractor, ExtractorRegistry, Language, ParseResult};
pub use scanner::{ExcludeMatcher, FileScanner, ScanOutcome, ScannedFile, SourceRoots, SymlinkPolicy};
