use super::{
    Extractor, Language, ParseResult, create_ts_parser, first_doc_line, get_node_text, node_line,
    parse_tree,
};
use crate::types::{ClassInfo, FunctionInfo, Parameter, Result, Signature, Symbol, SymbolInfo};

pub struct PythonExtractor;

impl PythonExtractor {
    pub fn new() -> Result<Self> {
        // Validate that the language is available
        let _ = create_ts_parser(tree_sitter_python::LANGUAGE, "Python")?;
        Ok(Self)
    }
}

impl Extractor for PythonExtractor {
    fn extract(&self, path: &str, content: &str) -> Result<ParseResult> {
        let tree = parse_tree(tree_sitter_python::LANGUAGE, "Python", path, content)?;
        let root = tree.root_node();
        let source = content.as_bytes();

        let mut result = ParseResult::new();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            if let Some(symbol) = extract_statement(child, source, false) {
                result.insert(symbol);
            }
        }

        Ok(result)
    }

    fn language(&self) -> Language {
        Language::Python
    }
}

/// Symbol declared by a block-level statement, if any
fn extract_statement(node: tree_sitter::Node, source: &[u8], in_class: bool) -> Option<Symbol> {
    match node.kind() {
        "function_definition" => extract_function(node, source, in_class).map(Symbol::Function),
        "class_definition" => extract_class(node, source).map(Symbol::Class),
        "decorated_definition" => node
            .child_by_field_name("definition")
            .and_then(|def| extract_statement(def, source, in_class)),
        "expression_statement" => extract_assignment(node, source).map(Symbol::Other),
        _ => None,
    }
}

fn extract_function(node: tree_sitter::Node, source: &[u8], in_class: bool) -> Option<FunctionInfo> {
    let name = get_node_text(node.child_by_field_name("name")?, source);
    if name.is_empty() {
        return None;
    }

    let is_async = node.child(0).is_some_and(|c| c.kind() == "async");

    let mut parameters = node
        .child_by_field_name("parameters")
        .map(|params| extract_parameters(params, source))
        .unwrap_or_default();
    if in_class
        && parameters
            .first()
            .is_some_and(|p| p.name == "self" || p.name == "cls")
    {
        parameters.remove(0);
    }

    let return_type = node
        .child_by_field_name("return_type")
        .map(|t| get_node_text(t, source).to_string());

    let doc = node
        .child_by_field_name("body")
        .and_then(|body| docstring(body, source));

    Some(
        FunctionInfo::new(name, node_line(node))
            .with_signature(Signature {
                parameters,
                return_type,
                is_async,
            })
            .with_doc(doc),
    )
}

fn extract_class(node: tree_sitter::Node, source: &[u8]) -> Option<ClassInfo> {
    let name = get_node_text(node.child_by_field_name("name")?, source);
    if name.is_empty() {
        return None;
    }

    let mut bases = Vec::new();
    if let Some(args) = node.child_by_field_name("superclasses") {
        let mut cursor = args.walk();
        for arg in args.named_children(&mut cursor) {
            // metaclass=..., total=False and friends are not bases
            if matches!(arg.kind(), "keyword_argument" | "comment") {
                continue;
            }
            let text = get_node_text(arg, source);
            if !text.is_empty() {
                bases.push(text.to_string());
            }
        }
    }

    let mut class = ClassInfo::new(name, node_line(node)).with_bases(bases);
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            if let Some(member) = extract_statement(child, source, true) {
                class.insert_member(member);
            }
        }
    }

    Some(class)
}

/// `NAME = value` or `NAME: T = value` at block level
fn extract_assignment(node: tree_sitter::Node, source: &[u8]) -> Option<SymbolInfo> {
    let assignment = node.named_child(0).filter(|n| n.kind() == "assignment")?;
    let target = assignment
        .child_by_field_name("left")
        .filter(|n| n.kind() == "identifier")?;
    let name = get_node_text(target, source);
    if name.is_empty() {
        return None;
    }
    Some(SymbolInfo::new(name, node_line(node)))
}

fn extract_parameters(node: tree_sitter::Node, source: &[u8]) -> Vec<Parameter> {
    let mut parameters = Vec::new();
    let mut cursor = node.walk();

    for param in node.named_children(&mut cursor) {
        let parsed = match param.kind() {
            "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" => {
                Some(Parameter::new(get_node_text(param, source)))
            }
            "typed_parameter" => param.named_child(0).map(|n| {
                Parameter::new(get_node_text(n, source))
                    .with_type(field_text(param, "type", source))
            }),
            "default_parameter" => param.child_by_field_name("name").map(|n| {
                Parameter::new(get_node_text(n, source))
                    .with_default(field_text(param, "value", source))
            }),
            "typed_default_parameter" => param.child_by_field_name("name").map(|n| {
                Parameter::new(get_node_text(n, source))
                    .with_type(field_text(param, "type", source))
                    .with_default(field_text(param, "value", source))
            }),
            // `*` and `/` separators carry no name
            _ => None,
        };

        if let Some(p) = parsed.filter(|p| !p.name.is_empty()) {
            parameters.push(p);
        }
    }

    parameters
}

fn field_text(node: tree_sitter::Node, field: &str, source: &[u8]) -> Option<String> {
    node.child_by_field_name(field)
        .map(|n| get_node_text(n, source).to_string())
        .filter(|s| !s.is_empty())
}

/// Summary line of the docstring opening `body`, if present
fn docstring(body: tree_sitter::Node, source: &[u8]) -> Option<String> {
    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let string = first.named_child(0).filter(|n| n.kind() == "string")?;
    let raw = get_node_text(string, source);
    first_doc_line(strip_string_literal(raw))
}

fn strip_string_literal(raw: &str) -> &str {
    let unprefixed = raw.trim_start_matches(|c: char| "rRbBuUfF".contains(c));
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(inner) = unprefixed
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            return inner;
        }
    }
    unprefixed
}
