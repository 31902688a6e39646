//! Symbol Model
//!
//! Tagged unions for everything the extractors report and the hierarchy
//! stores. Serialized with an internal `kind` tag so consumers can match on
//! the variant without knowing the Rust type.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analyzer::parser::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Class,
    Module,
    Package,
    Other,
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Function => write!(f, "function"),
            SymbolKind::Class => write!(f, "class"),
            SymbolKind::Module => write!(f, "module"),
            SymbolKind::Package => write!(f, "package"),
            SymbolKind::Other => write!(f, "other"),
        }
    }
}

/// Fields shared by every symbol variant.
///
/// The file half of the location is the owning module's `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: String,
    /// 1-based line of the definition
    pub line: u32,
}

impl SymbolInfo {
    pub fn new(name: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: None,
            default: None,
        }
    }

    pub fn with_type(mut self, param_type: Option<String>) -> Self {
        self.param_type = param_type;
        self
    }

    pub fn with_default(mut self, default: Option<String>) -> Self {
        self.default = default;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(rename = "async", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_async: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    #[serde(flatten)]
    pub info: SymbolInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
    /// First non-empty line of the docstring / doc comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl FunctionInfo {
    pub fn new(name: impl Into<String>, line: u32) -> Self {
        Self {
            info: SymbolInfo::new(name, line),
            signature: None,
            doc: None,
        }
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn with_doc(mut self, doc: Option<String>) -> Self {
        self.doc = doc;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    #[serde(flatten)]
    pub info: SymbolInfo,
    /// Base types by name, unresolved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<String>,
    /// Member symbols; `None` once collapsed to `member_count`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<BTreeMap<String, Symbol>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_count: Option<usize>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>, line: u32) -> Self {
        Self {
            info: SymbolInfo::new(name, line),
            bases: Vec::new(),
            members: Some(BTreeMap::new()),
            member_count: None,
        }
    }

    pub fn with_bases(mut self, bases: Vec<String>) -> Self {
        self.bases = bases;
        self
    }

    /// Insert a member; a later member with the same name replaces the earlier one
    pub fn insert_member(&mut self, symbol: Symbol) {
        self.members
            .get_or_insert_with(BTreeMap::new)
            .insert(symbol.name().to_string(), symbol);
    }

    /// Number of direct members, whether expanded or collapsed
    pub fn member_total(&self) -> usize {
        match &self.members {
            Some(members) => members.len(),
            None => self.member_count.unwrap_or(0),
        }
    }
}

/// Per-file symbol variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Symbol {
    Function(FunctionInfo),
    Class(ClassInfo),
    Other(SymbolInfo),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Function(f) => &f.info.name,
            Symbol::Class(c) => &c.info.name,
            Symbol::Other(o) => &o.name,
        }
    }

    pub fn line(&self) -> u32 {
        match self {
            Symbol::Function(f) => f.info.line,
            Symbol::Class(c) => c.info.line,
            Symbol::Other(o) => o.line,
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            Symbol::Function(_) => SymbolKind::Function,
            Symbol::Class(_) => SymbolKind::Class,
            Symbol::Other(_) => SymbolKind::Other,
        }
    }
}

/// Extracted structure of one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    /// Path relative to the owning source root, forward slashes
    pub path: String,
    /// Index into `metadata.sources`
    pub source: usize,
    pub language: Language,
    #[serde(default)]
    pub symbols: BTreeMap<String, Symbol>,
}

impl ModuleInfo {
    pub fn new(path: impl Into<String>, source: usize, language: Language) -> Self {
        Self {
            path: path.into(),
            source,
            language,
            symbols: BTreeMap::new(),
        }
    }

    pub fn with_symbols(mut self, symbols: BTreeMap<String, Symbol>) -> Self {
        self.symbols = symbols;
        self
    }

    /// File name without extension, used as the hierarchy key
    pub fn stem(&self) -> &str {
        let file_name = self.file_name();
        match file_name.rfind('.') {
            Some(idx) if idx > 0 => &file_name[..idx],
            _ => file_name,
        }
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSummary {
    pub modules: usize,
    pub symbols: usize,
}

/// Directory grouping of modules and nested packages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Directory relative to the owning source root, forward slashes
    pub path: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, Node>,
    /// Present only once module detail has been collapsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<PackageSummary>,
}

impl PackageInfo {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            children: BTreeMap::new(),
            summary: None,
        }
    }
}

/// Hierarchy entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Package(PackageInfo),
    Module(ModuleInfo),
}

impl Node {
    pub fn kind(&self) -> SymbolKind {
        match self {
            Node::Package(_) => SymbolKind::Package,
            Node::Module(_) => SymbolKind::Module,
        }
    }

    pub fn as_module(&self) -> Option<&ModuleInfo> {
        match self {
            Node::Module(m) => Some(m),
            Node::Package(_) => None,
        }
    }

    pub fn as_package(&self) -> Option<&PackageInfo> {
        match self {
            Node::Package(p) => Some(p),
            Node::Module(_) => None,
        }
    }
}

/// Top-level name → package or module
pub type Hierarchy = BTreeMap<String, Node>;
