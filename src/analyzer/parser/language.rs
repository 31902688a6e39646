//! Language Detection Module
//!
//! **Single source of truth** for mapping file paths to languages.
//! The scanner uses it to pick candidate files, the registry uses it to pick
//! an extractor, and modules record it in their `language` field.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use code_skeleton::analyzer::parser::Language;
//!
//! let lang = Language::from_path("pkg/mod.py");
//! assert_eq!(lang, Language::Python);
//! assert_eq!(lang.id(), "python");
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// Language Metadata Table - Single Source of Truth
// =============================================================================

/// Language metadata entry containing all language-specific information
struct LanguageMeta {
    /// Display name (human-readable)
    display_name: &'static str,
    /// Stable lowercase identifier, as serialized
    id: &'static str,
    /// File extensions that map to this language
    extensions: &'static [&'static str],
    /// Alternative names for parsing from string
    aliases: &'static [&'static str],
    /// Whether a tree-sitter extractor ships for this language
    has_extractor: bool,
}

/// Macro to define language metadata concisely
macro_rules! lang_meta {
    ($display:literal, $id:literal, [$($ext:literal),*], [$($alias:literal),*], $extractor:literal) => {
        LanguageMeta {
            display_name: $display,
            id: $id,
            extensions: &[$($ext),*],
            aliases: &[$($alias),*],
            has_extractor: $extractor,
        }
    };
}

impl Language {
    /// Get metadata for this language variant
    fn meta(&self) -> LanguageMeta {
        match self {
            Language::Python => lang_meta!("Python", "python", ["py", "pyi"], ["python", "py"], true),
            Language::Rust => lang_meta!("Rust", "rust", ["rs"], ["rust", "rs"], true),
            Language::Unknown => lang_meta!("Unknown", "unknown", [], ["unknown", "text", ""], false),
        }
    }
}

// =============================================================================
// Language Enum Definition
// =============================================================================

/// Languages the extractors understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Rust,
    #[default]
    Unknown,
}

// =============================================================================
// Language Methods (using metadata table)
// =============================================================================

impl Language {
    /// Display name (human-readable)
    pub fn as_str(&self) -> &'static str {
        self.meta().display_name
    }

    /// Lowercase identifier used in documents
    pub fn id(&self) -> &'static str {
        self.meta().id
    }

    /// File extensions recognised for this language
    pub fn extensions(&self) -> &'static [&'static str] {
        self.meta().extensions
    }

    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        let ext_lower = ext.to_lowercase();

        for lang in Self::all_variants() {
            if lang.meta().extensions.iter().any(|e| *e == ext_lower) {
                return *lang;
            }
        }

        Language::Unknown
    }

    /// Detect language from file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    /// Check if this is a known language (not Unknown)
    pub fn is_known(&self) -> bool {
        !matches!(self, Language::Unknown)
    }

    /// Check if a tree-sitter extractor ships for this language
    pub fn has_extractor(&self) -> bool {
        self.meta().has_extractor
    }

    /// All known variants, in detection order
    pub fn all_variants() -> &'static [Language] {
        &[Language::Python, Language::Rust]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Language {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s_lower = s.to_lowercase();

        for lang in Self::all_variants() {
            if lang.meta().aliases.iter().any(|a| *a == s_lower) {
                return Ok(*lang);
            }
        }

        if s_lower.is_empty() || s_lower == "unknown" || s_lower == "text" {
            return Ok(Language::Unknown);
        }

        Err(())
    }
}
