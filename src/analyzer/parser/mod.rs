//! Symbol Extractor Module
//!
//! Tree-sitter based extractors that turn one source file into its symbols.
//!
//! ## Extractor Registry
//!
//! The generator resolves an extractor per file through an
//! [`ExtractorRegistry`]; the scanner asks the same registry which file
//! extensions are worth visiting.
//!
//! ```rust,ignore
//! use code_skeleton::analyzer::parser::{ExtractorRegistry, Language};
//!
//! let registry = ExtractorRegistry::with_defaults()?;
//! let extractor = registry.for_path("pkg/mod.py").unwrap();
//! let result = extractor.extract("pkg/mod.py", content)?;
//! ```

pub mod language;
pub mod python;
pub mod rust_lang;
pub mod traits;

pub use language::Language;
pub use python::PythonExtractor;
pub use rust_lang::RustExtractor;
pub use traits::{
    Extractor, ParseResult, create_ts_parser, first_doc_line, get_node_text, node_line,
    parse_tree,
};

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use crate::types::{Result, SkeletonError};

/// Shared extractor for thread-safe access
pub type SharedExtractor = Arc<dyn Extractor>;

/// Create an extractor for the given language.
///
/// Returns an error if no extractor ships for the language.
pub fn create_extractor(language: Language) -> Result<Box<dyn Extractor>> {
    match language {
        Language::Python => Ok(Box::new(PythonExtractor::new()?)),
        Language::Rust => Ok(Box::new(RustExtractor::new()?)),
        Language::Unknown => Err(SkeletonError::Config(format!(
            "No extractor for language: {}",
            language
        ))),
    }
}

/// Create a shared extractor for concurrent access.
pub fn create_shared_extractor(language: Language) -> Result<SharedExtractor> {
    let extractor = create_extractor(language)?;
    Ok(Arc::from(extractor))
}

/// Extractors keyed by language.
///
/// Cheap to clone; extractors are shared between workers.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    extractors: HashMap<Language, SharedExtractor>,
}

impl ExtractorRegistry {
    /// Empty registry; no file is a candidate until something is registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in extractor
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();
        for language in Language::all_variants() {
            if language.has_extractor() {
                registry.register(create_shared_extractor(*language)?);
            }
        }
        Ok(registry)
    }

    /// Add an extractor, replacing any previous one for the same language
    pub fn register(&mut self, extractor: SharedExtractor) {
        self.extractors.insert(extractor.language(), extractor);
    }

    pub fn get(&self, language: Language) -> Option<&SharedExtractor> {
        self.extractors.get(&language)
    }

    /// Extractor for a file, chosen by extension
    pub fn for_path(&self, path: impl AsRef<Path>) -> Option<&SharedExtractor> {
        self.get(Language::from_path(path))
    }

    pub fn supports(&self, path: impl AsRef<Path>) -> bool {
        self.for_path(path).is_some()
    }

    /// Every extension with a registered extractor, sorted
    pub fn extensions(&self) -> BTreeSet<&'static str> {
        self.extractors
            .keys()
            .flat_map(|lang| lang.extensions().iter().copied())
            .collect()
    }

    pub fn languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self.extractors.keys().copied().collect();
        languages.sort_by_key(|l| l.id());
        languages
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}
