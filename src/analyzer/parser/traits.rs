use std::collections::BTreeMap;

use crate::types::{Result, SkeletonError, Symbol};

/// Symbols found in one file, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    pub symbols: BTreeMap<String, Symbol>,
}

impl ParseResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a top-level symbol; a later definition with the same name wins
    pub fn insert(&mut self, symbol: Symbol) {
        self.symbols.insert(symbol.name().to_string(), symbol);
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Per-language symbol extraction.
///
/// Implementations must be pure with respect to their inputs: the same
/// `content` always yields the same symbols. Errors are per-file and the
/// caller records them instead of aborting the run.
pub trait Extractor: Send + Sync {
    fn extract(&self, path: &str, content: &str) -> Result<ParseResult>;
    fn language(&self) -> super::Language;
}

/// Extract text content from a tree-sitter node.
/// Returns empty string if extraction fails (with debug logging).
#[inline]
pub fn get_node_text<'a>(node: tree_sitter::Node, content: &'a [u8]) -> &'a str {
    node.utf8_text(content).unwrap_or_else(|e| {
        tracing::debug!(
            "UTF-8 extraction failed at {}:{}-{}:{}: {}",
            node.start_position().row + 1,
            node.start_position().column,
            node.end_position().row + 1,
            node.end_position().column,
            e
        );
        ""
    })
}

/// 1-based start line of a tree-sitter node
#[inline]
pub fn node_line(node: tree_sitter::Node) -> u32 {
    node.start_position().row as u32 + 1
}

/// Create a tree-sitter parser for the given language.
/// This helper reduces boilerplate in language-specific extractors.
pub fn create_ts_parser<L: Into<tree_sitter::Language>>(
    language: L,
    lang_name: &str,
) -> Result<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language.into())
        .map_err(|e| SkeletonError::Parse {
            message: format!("Failed to set {} language: {}", lang_name, e),
            path: String::new(),
        })?;
    Ok(parser)
}

/// Parse `content` into a tree, rejecting trees that contain syntax errors.
pub fn parse_tree<L: Into<tree_sitter::Language>>(
    language: L,
    lang_name: &str,
    path: &str,
    content: &str,
) -> Result<tree_sitter::Tree> {
    let mut parser = create_ts_parser(language, lang_name).map_err(|mut e| {
        // Point the error at the file being parsed
        if let SkeletonError::Parse {
            path: ref mut p, ..
        } = e
        {
            *p = path.to_string();
        }
        e
    })?;

    let tree = parser
        .parse(content, None)
        .ok_or_else(|| SkeletonError::parse(path, format!("Failed to parse {} file", lang_name)))?;

    let root = tree.root_node();
    if root.has_error() {
        let line = first_error_line(root).unwrap_or(1);
        return Err(SkeletonError::parse(
            path,
            format!("{} syntax error near line {}", lang_name, line),
        ));
    }

    Ok(tree)
}

fn first_error_line(node: tree_sitter::Node) -> Option<u32> {
    if node.is_error() || node.is_missing() {
        return Some(node_line(node));
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error()
            && let Some(line) = first_error_line(child)
        {
            return Some(line);
        }
    }
    None
}

/// First non-empty line of a doc block, trimmed
pub fn first_doc_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FunctionInfo, SymbolInfo};

    #[test]
    fn test_parse_result_last_write_wins() {
        let mut result = ParseResult::new();
        result.insert(Symbol::Function(FunctionInfo::new("handler", 1)));
        result.insert(Symbol::Other(SymbolInfo::new("handler", 7)));

        assert_eq!(result.len(), 1);
        assert_eq!(result.symbols["handler"].line(), 7);
    }

    #[test]
    fn test_first_doc_line() {
        assert_eq!(
            first_doc_line("\n   Summary here.\n  More detail.\n"),
            Some("Summary here.".to_string())
        );
        assert_eq!(first_doc_line("   \n\n"), None);
    }

    #[test]
    fn test_parse_tree_reports_syntax_error() {
        let err = parse_tree(tree_sitter_python::LANGUAGE, "Python", "bad.py", "def (:\n")
            .unwrap_err();
        match err {
            SkeletonError::Parse { path, message } => {
                assert_eq!(path, "bad.py");
                assert!(message.contains("syntax error"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_tree_accepts_valid_source() {
        let tree = parse_tree(tree_sitter_rust::LANGUAGE, "Rust", "ok.rs", "fn main() {}\n");
        assert!(tree.is_ok());
    }
}
