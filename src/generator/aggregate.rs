//! Resolution Aggregator
//!
//! Builds the full package/module tree from extracted modules and projects
//! it down to a resolution level. Projection only ever removes detail, so
//! projecting an already-projected tree to the same or a coarser level gives
//! the same result as projecting the original.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::types::{
    ClassInfo, FunctionInfo, Hierarchy, ModuleInfo, Node, PackageInfo, PackageSummary,
    ResolutionLevel, Symbol,
};

/// Group modules into packages by directory.
///
/// Modules must arrive sorted by `(source, path)`. A module is keyed by its
/// file stem unless that name is shared with a sibling:
///
/// - a package or another module with the same stem: every clashing module
///   is keyed by its file name (`tool.py`, `tool.pyi`), the package keeps
///   the bare name;
/// - a module at the same relative path under another source root: keyed
///   `<file name>@<source index>`.
///
/// No extracted module is ever displaced by another.
pub fn build_tree(modules: impl IntoIterator<Item = ModuleInfo>) -> Hierarchy {
    let modules: Vec<ModuleInfo> = modules.into_iter().collect();
    let siblings = SiblingNames::new(&modules);

    let mut root = Hierarchy::new();
    for module in modules {
        let key = siblings.key_for(&module);
        let path = module.path.clone();
        let mut dirs: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        dirs.pop();
        insert_module(&mut root, &dirs, "", key, module);
    }
    root
}

/// Name usage per directory, across all source roots
#[derive(Default)]
struct SiblingNames {
    packages: HashSet<String>,
    stems: HashMap<String, usize>,
    file_names: HashMap<String, usize>,
}

impl SiblingNames {
    fn new(modules: &[ModuleInfo]) -> Self {
        let mut names = Self::default();
        for module in modules {
            let dir = parent_dir(&module.path);
            *names.stems.entry(join(dir, module.stem())).or_default() += 1;
            *names.file_names.entry(join(dir, module.file_name())).or_default() += 1;

            let mut ancestor = dir;
            while !ancestor.is_empty() {
                names.packages.insert(ancestor.to_string());
                ancestor = parent_dir(ancestor);
            }
        }
        names
    }

    fn key_for(&self, module: &ModuleInfo) -> String {
        let dir = parent_dir(&module.path);
        let file_name = module.file_name();

        if self.file_names.get(&join(dir, file_name)).copied().unwrap_or(0) > 1 {
            return format!("{}@{}", file_name, module.source);
        }

        let stem_path = join(dir, module.stem());
        if self.stems.get(&stem_path).copied().unwrap_or(0) > 1
            || self.packages.contains(&stem_path)
        {
            file_name.to_string()
        } else {
            module.stem().to_string()
        }
    }
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// First of `key`, `key~2`, `key~3`, ... not yet taken in `children`
fn free_key(children: &Hierarchy, key: String) -> String {
    if !children.contains_key(&key) {
        return key;
    }
    (2..)
        .map(|n| format!("{}~{}", key, n))
        .find(|candidate| !children.contains_key(candidate))
        .unwrap_or(key)
}

fn insert_module(
    children: &mut Hierarchy,
    dirs: &[&str],
    prefix: &str,
    key: String,
    module: ModuleInfo,
) {
    match dirs.split_first() {
        None => {
            let key = free_key(children, key);
            children.insert(key, Node::Module(module));
        }
        Some((dir, rest)) => {
            let path = if prefix.is_empty() {
                dir.to_string()
            } else {
                format!("{}/{}", prefix, dir)
            };

            // A module whose file name equals this directory gives way to it
            if matches!(children.get(*dir), Some(Node::Module(_)))
                && let Some(Node::Module(existing)) = children.remove(*dir)
            {
                let moved = free_key(children, format!("{}@{}", existing.file_name(), existing.source));
                children.insert(moved, Node::Module(existing));
            }

            let node = children
                .entry(dir.to_string())
                .or_insert_with(|| Node::Package(PackageInfo::new(path.clone())));
            if let Node::Package(package) = node {
                insert_module(&mut package.children, rest, &path, key, module);
            }
        }
    }
}

/// Project a hierarchy to `level`
pub fn project(hierarchy: &Hierarchy, level: ResolutionLevel) -> Hierarchy {
    project_nodes(hierarchy, level)
}

fn project_nodes(nodes: &Hierarchy, level: ResolutionLevel) -> Hierarchy {
    nodes
        .iter()
        .filter_map(|(key, node)| match node {
            Node::Package(package) => {
                Some((key.clone(), Node::Package(project_package(package, level))))
            }
            Node::Module(module) => level
                .retains_modules()
                .then(|| (key.clone(), Node::Module(project_module(module, level)))),
        })
        .collect()
}

fn project_package(package: &PackageInfo, level: ResolutionLevel) -> PackageInfo {
    let summary = if level.retains_modules() {
        package.summary
    } else {
        Some(summarize(package))
    };

    PackageInfo {
        path: package.path.clone(),
        children: project_nodes(&package.children, level),
        summary,
    }
}

/// Recursive module and top-level symbol totals under a package
pub fn summarize(package: &PackageInfo) -> PackageSummary {
    if let Some(summary) = package.summary {
        return summary;
    }

    package
        .children
        .values()
        .fold(PackageSummary::default(), |mut acc, node| {
            match node {
                Node::Module(module) => {
                    acc.modules += 1;
                    acc.symbols += module.symbols.len();
                }
                Node::Package(child) => {
                    let nested = summarize(child);
                    acc.modules += nested.modules;
                    acc.symbols += nested.symbols;
                }
            }
            acc
        })
}

/// Project a single module's symbols to `level`
pub fn project_module(module: &ModuleInfo, level: ResolutionLevel) -> ModuleInfo {
    ModuleInfo {
        path: module.path.clone(),
        source: module.source,
        language: module.language,
        symbols: project_symbols(&module.symbols, level),
    }
}

fn project_symbols(
    symbols: &BTreeMap<String, Symbol>,
    level: ResolutionLevel,
) -> BTreeMap<String, Symbol> {
    symbols
        .iter()
        .map(|(name, symbol)| (name.clone(), project_symbol(symbol, level)))
        .collect()
}

fn project_symbol(symbol: &Symbol, level: ResolutionLevel) -> Symbol {
    match symbol {
        Symbol::Function(function) if level.retains_signatures() => {
            Symbol::Function(function.clone())
        }
        Symbol::Function(function) => Symbol::Function(FunctionInfo {
            info: function.info.clone(),
            signature: None,
            doc: None,
        }),
        Symbol::Class(class) => Symbol::Class(project_class(class, level)),
        Symbol::Other(info) => Symbol::Other(info.clone()),
    }
}

fn project_class(class: &ClassInfo, level: ResolutionLevel) -> ClassInfo {
    if level.retains_members() {
        ClassInfo {
            info: class.info.clone(),
            bases: class.bases.clone(),
            members: class
                .members
                .as_ref()
                .map(|members| project_symbols(members, level)),
            member_count: class.member_count,
        }
    } else {
        ClassInfo {
            info: class.info.clone(),
            bases: class.bases.clone(),
            members: None,
            member_count: Some(class.member_total()),
        }
    }
}

/// Number of modules below a node (a module counts itself)
pub fn module_count(node: &Node) -> usize {
    match node {
        Node::Module(_) => 1,
        Node::Package(package) => match package.summary {
            Some(summary) => summary.modules,
            None => package.children.values().map(module_count).sum(),
        },
    }
}
