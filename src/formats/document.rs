//! Borrowed document views.
//!
//! Each output document is rendered from a view that borrows the skeleton,
//! so format passes never mutate or copy the hierarchy itself.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{Hierarchy, ModuleInfo, Node, PackageInfo, ResolutionLevel};

#[derive(Debug, Serialize)]
pub struct HierarchyDocument<'a> {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub metadata: MetadataView<'a>,
    pub hierarchy: BTreeMap<&'a str, HierarchyEntry<'a>>,
}

/// Metadata with sources rewritten relative to the output directory
#[derive(Debug, Serialize)]
pub struct MetadataView<'a> {
    pub sources: Vec<String>,
    pub level: ResolutionLevel,
    pub generated_at: &'a DateTime<Utc>,
    pub version: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HierarchyEntry<'a> {
    Inline(&'a Node),
    Link(PackageLink),
}

/// Stand-in for a package whose modules live in their own document
#[derive(Debug, Serialize)]
pub struct PackageLink {
    pub kind: &'static str,
    pub path: String,
    pub document: String,
    pub modules: usize,
}

impl PackageLink {
    pub fn new(path: impl Into<String>, document: impl Into<String>, modules: usize) -> Self {
        Self {
            kind: "package",
            path: path.into(),
            document: document.into(),
            modules,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PackageDocument<'a> {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub package: &'a str,
    pub modules: BTreeMap<String, &'a ModuleInfo>,
}

/// Every module under `package`, keyed by dotted name relative to it.
///
/// When two modules flatten to the same dotted name, the later one in key
/// order is keyed `<path>@<source>` instead.
pub fn flatten_modules(package: &PackageInfo) -> BTreeMap<String, &ModuleInfo> {
    let mut modules = BTreeMap::new();
    collect(&package.children, "", &mut modules);
    modules
}

fn collect<'a>(children: &'a Hierarchy, prefix: &str, out: &mut BTreeMap<String, &'a ModuleInfo>) {
    for (key, node) in children {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match node {
            Node::Module(module) => {
                let name = if out.contains_key(&name) {
                    // `a.b.py` and `a/b.py` both flatten to `a.b`
                    let fallback = format!("{}@{}", module.path, module.source);
                    tracing::warn!(
                        "Dotted name {} already taken, using {} for {}",
                        name,
                        fallback,
                        module.path
                    );
                    fallback
                } else {
                    name
                };
                out.insert(name, module);
            }
            Node::Package(package) => collect(&package.children, &name, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::parser::Language;

    #[test]
    fn test_flatten_modules_dotted_names() {
        let mut sub = PackageInfo::new("pkg/sub");
        sub.children.insert(
            "inner".into(),
            Node::Module(ModuleInfo::new("pkg/sub/inner.py", 0, Language::Python)),
        );
        let mut pkg = PackageInfo::new("pkg");
        pkg.children.insert(
            "mod".into(),
            Node::Module(ModuleInfo::new("pkg/mod.py", 0, Language::Python)),
        );
        pkg.children.insert("sub".into(), Node::Package(sub));

        let flat = flatten_modules(&pkg);
        assert_eq!(flat.keys().collect::<Vec<_>>(), vec!["mod", "sub.inner"]);
        assert_eq!(flat["sub.inner"].path, "pkg/sub/inner.py");
    }

    #[test]
    fn test_flatten_modules_dotted_name_clash() {
        let mut nested = PackageInfo::new("pkg/a");
        nested.children.insert(
            "b".into(),
            Node::Module(ModuleInfo::new("pkg/a/b.py", 0, Language::Python)),
        );
        let mut pkg = PackageInfo::new("pkg");
        pkg.children.insert("a".into(), Node::Package(nested));
        pkg.children.insert(
            "a.b".into(),
            Node::Module(ModuleInfo::new("pkg/a.b.py", 0, Language::Python)),
        );

        let flat = flatten_modules(&pkg);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat["a.b"].path, "pkg/a/b.py");
        assert_eq!(flat["pkg/a.b.py@0"].path, "pkg/a.b.py");
    }

    #[test]
    fn test_package_link_serialization() {
        let link = HierarchyEntry::Link(PackageLink::new("pkg", "./modules/pkg.json", 2));
        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(value["kind"], "package");
        assert_eq!(value["document"], "./modules/pkg.json");
        assert_eq!(value["modules"], 2);
    }
}
