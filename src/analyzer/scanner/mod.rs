//! Source Scanner
//!
//! Walks source roots under a symlink policy and exclude rules, producing
//! the sorted list of files handed to the extractors.

pub mod exclude;
pub mod file_scanner;
pub mod gitignore;
pub mod policy;

pub use exclude::ExcludeMatcher;
pub use file_scanner::{FileScanner, ScanOutcome, ScannedFile, SourceRoots};
pub use gitignore::GitIgnoreFilter;
pub use policy::SymlinkPolicy;
