use super::{
    Extractor, Language, ParseResult, create_ts_parser, first_doc_line, get_node_text, node_line,
    parse_tree,
};
use crate::types::{ClassInfo, FunctionInfo, Parameter, Result, Signature, Symbol, SymbolInfo};

pub struct RustExtractor;

impl RustExtractor {
    pub fn new() -> Result<Self> {
        // Validate parser creation at construction time
        let _ = create_ts_parser(tree_sitter_rust::LANGUAGE, "Rust")?;
        Ok(Self)
    }
}

impl Extractor for RustExtractor {
    fn extract(&self, path: &str, content: &str) -> Result<ParseResult> {
        let tree = parse_tree(tree_sitter_rust::LANGUAGE, "Rust", path, content)?;
        let root = tree.root_node();
        let source = content.as_bytes();

        let mut result = ParseResult::new();

        // Declarations first so impl blocks always find their type
        let mut cursor = root.walk();
        for item in root.named_children(&mut cursor) {
            if let Some(symbol) = extract_item(item, source) {
                result.insert(symbol);
            }
        }

        let mut cursor = root.walk();
        for item in root.named_children(&mut cursor) {
            if item.kind() == "impl_item" {
                merge_impl(item, source, &mut result);
            }
        }

        Ok(result)
    }

    fn language(&self) -> Language {
        Language::Rust
    }
}

fn extract_item(node: tree_sitter::Node, source: &[u8]) -> Option<Symbol> {
    match node.kind() {
        "function_item" | "function_signature_item" => {
            extract_function(node, source).map(Symbol::Function)
        }
        "struct_item" | "enum_item" | "union_item" => {
            let name = name_of(node, source)?;
            Some(Symbol::Class(ClassInfo::new(name, node_line(node))))
        }
        "trait_item" => extract_trait(node, source).map(Symbol::Class),
        "const_item" | "static_item" | "mod_item" | "type_item" | "macro_definition" => {
            let name = name_of(node, source)?;
            Some(Symbol::Other(SymbolInfo::new(name, node_line(node))))
        }
        _ => None,
    }
}

fn name_of<'a>(node: tree_sitter::Node, source: &'a [u8]) -> Option<&'a str> {
    let name = get_node_text(node.child_by_field_name("name")?, source);
    (!name.is_empty()).then_some(name)
}

fn extract_function(node: tree_sitter::Node, source: &[u8]) -> Option<FunctionInfo> {
    let name = name_of(node, source)?;

    let is_async = {
        let mut cursor = node.walk();
        node.children(&mut cursor).any(|c| {
            c.kind() == "function_modifiers" && get_node_text(c, source).contains("async")
        })
    };

    let parameters = node
        .child_by_field_name("parameters")
        .map(|params| extract_parameters(params, source))
        .unwrap_or_default();

    let return_type = node
        .child_by_field_name("return_type")
        .map(|t| get_node_text(t, source).to_string());

    Some(
        FunctionInfo::new(name, node_line(node))
            .with_signature(Signature {
                parameters,
                return_type,
                is_async,
            })
            .with_doc(doc_comment(node, source)),
    )
}

fn extract_parameters(node: tree_sitter::Node, source: &[u8]) -> Vec<Parameter> {
    let mut parameters = Vec::new();
    let mut cursor = node.walk();

    for param in node.named_children(&mut cursor) {
        // self_parameter, variadic_parameter and attributes are not recorded
        if param.kind() != "parameter" {
            continue;
        }
        let Some(pattern) = param.child_by_field_name("pattern") else {
            continue;
        };
        let name = get_node_text(pattern, source);
        if name.is_empty() {
            continue;
        }
        let param_type = param
            .child_by_field_name("type")
            .map(|t| get_node_text(t, source).to_string());
        parameters.push(Parameter::new(name).with_type(param_type));
    }

    parameters
}

fn extract_trait(node: tree_sitter::Node, source: &[u8]) -> Option<ClassInfo> {
    let name = name_of(node, source)?;

    let mut bases = Vec::new();
    if let Some(bounds) = node.child_by_field_name("bounds") {
        let mut cursor = bounds.walk();
        for bound in bounds.named_children(&mut cursor) {
            let text = get_node_text(bound, source);
            if !text.is_empty() {
                bases.push(text.to_string());
            }
        }
    }

    let mut class = ClassInfo::new(name, node_line(node)).with_bases(bases);
    if let Some(body) = node.child_by_field_name("body") {
        collect_members(body, source, &mut class);
    }
    Some(class)
}

/// Fold an `impl` block's items into the class entry for its type.
///
/// A type declared in another file gets an entry at the impl's line.
fn merge_impl(node: tree_sitter::Node, source: &[u8], result: &mut ParseResult) {
    let Some(type_name) = node
        .child_by_field_name("type")
        .and_then(|t| impl_type_name(t, source))
    else {
        return;
    };

    let trait_name = node
        .child_by_field_name("trait")
        .map(|t| get_node_text(t, source).to_string())
        .filter(|t| !t.is_empty());

    let entry = result
        .symbols
        .entry(type_name.to_string())
        .or_insert_with(|| Symbol::Class(ClassInfo::new(type_name, node_line(node))));

    // A const or type alias with the same name cannot own methods
    let Symbol::Class(class) = entry else {
        return;
    };

    if let Some(trait_name) = trait_name
        && !class.bases.contains(&trait_name)
    {
        class.bases.push(trait_name);
    }

    if let Some(body) = node.child_by_field_name("body") {
        collect_members(body, source, class);
    }
}

fn collect_members(body: tree_sitter::Node, source: &[u8], class: &mut ClassInfo) {
    let mut cursor = body.walk();
    for item in body.named_children(&mut cursor) {
        let member = match item.kind() {
            "function_item" | "function_signature_item" => {
                extract_function(item, source).map(Symbol::Function)
            }
            "const_item" | "type_item" | "associated_type" => name_of(item, source)
                .map(|name| Symbol::Other(SymbolInfo::new(name, node_line(item)))),
            _ => None,
        };
        if let Some(member) = member {
            class.insert_member(member);
        }
    }
}

/// Bare type name of an impl target: `Foo<T>` and `crate::a::Foo` both give `Foo`
fn impl_type_name<'a>(node: tree_sitter::Node, source: &'a [u8]) -> Option<&'a str> {
    let target = match node.kind() {
        "generic_type" => node.child_by_field_name("type")?,
        _ => node,
    };
    let target = match target.kind() {
        "scoped_type_identifier" => target.child_by_field_name("name")?,
        _ => target,
    };
    let name = get_node_text(target, source);
    (!name.is_empty()).then_some(name)
}

/// First line of the `///` or `/** */` comment block directly above `node`
fn doc_comment(node: tree_sitter::Node, source: &[u8]) -> Option<String> {
    let mut lines = Vec::new();
    let mut sibling = node.prev_sibling();

    while let Some(prev) = sibling {
        match prev.kind() {
            "attribute_item" => {}
            "line_comment" => {
                let text = get_node_text(prev, source);
                match text.strip_prefix("///") {
                    Some(rest) if !rest.starts_with('/') => lines.push(rest.trim().to_string()),
                    _ => break,
                }
            }
            "block_comment" => {
                let text = get_node_text(prev, source);
                match text.strip_prefix("/**") {
                    Some(rest) if !rest.starts_with('*') => {
                        let inner = rest.strip_suffix("*/").unwrap_or(rest);
                        lines.push(
                            inner
                                .lines()
                                .map(|l| l.trim().trim_start_matches('*').trim())
                                .collect::<Vec<_>>()
                                .join("\n"),
                        );
                    }
                    _ => break,
                }
            }
            _ => break,
        }
        sibling = prev.prev_sibling();
    }

    lines.reverse();
    first_doc_line(&lines.join("\n"))
}
