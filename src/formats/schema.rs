//! JSON Schemas for Output Documents
//!
//! One schema per document shape. Both schemas share the symbol and module
//! definitions so a consumer can validate a module the same way whether it
//! is embedded in the hierarchy or split into a package document.

use serde_json::{Value, json};

use crate::constants::output::SCHEMA_DIALECT;

/// Schema provider for skeleton documents
pub struct DocumentSchemas;

impl DocumentSchemas {
    /// Schema for `hierarchy.<ext>`
    pub fn hierarchy_schema() -> Value {
        json!({
            "$schema": SCHEMA_DIALECT,
            "$id": "hierarchy.schema.json",
            "title": "Code skeleton hierarchy",
            "description": "Package and module tree of one or more source roots at a fixed resolution level",
            "type": "object",
            "required": ["$schema", "metadata", "hierarchy"],
            "additionalProperties": false,
            "properties": {
                "$schema": {"type": "string", "description": "Path of this schema relative to the document"},
                "metadata": {"$ref": "#/$defs/metadata"},
                "hierarchy": {
                    "type": "object",
                    "description": "Top-level package or module name to entry",
                    "additionalProperties": {"$ref": "#/$defs/entry"}
                }
            },
            "$defs": Self::shared_defs(true)
        })
    }

    /// Schema for `modules/<package>.<ext>`
    pub fn module_schema() -> Value {
        json!({
            "$schema": SCHEMA_DIALECT,
            "$id": "module.schema.json",
            "title": "Code skeleton package document",
            "description": "Every module under one top-level package, keyed by dotted name relative to that package",
            "type": "object",
            "required": ["$schema", "package", "modules"],
            "additionalProperties": false,
            "properties": {
                "$schema": {"type": "string", "description": "Path of this schema relative to the document"},
                "package": {"type": "string", "description": "Top-level package name"},
                "modules": {
                    "type": "object",
                    "description": "Dotted module name (e.g. 'mod', 'sub.inner') to module",
                    "additionalProperties": {"$ref": "#/$defs/module"}
                }
            },
            "$defs": Self::shared_defs(false)
        })
    }

    fn shared_defs(with_hierarchy: bool) -> Value {
        let mut defs = json!({
            "module": {
                "type": "object",
                "description": "Structure extracted from one source file",
                "required": ["kind", "path", "source", "language"],
                "properties": {
                    "kind": {"const": "module"},
                    "path": {"type": "string", "description": "Path relative to the source root, forward slashes"},
                    "source": {"type": "integer", "minimum": 0, "description": "Index into metadata.sources"},
                    "language": {"type": "string", "enum": ["python", "rust", "unknown"]},
                    "symbols": {
                        "type": "object",
                        "additionalProperties": {"$ref": "#/$defs/symbol"}
                    }
                }
            },
            "symbol": {
                "oneOf": [
                    {"$ref": "#/$defs/function"},
                    {"$ref": "#/$defs/class"},
                    {"$ref": "#/$defs/other"}
                ]
            },
            "function": {
                "type": "object",
                "required": ["kind", "name", "line"],
                "additionalProperties": false,
                "properties": {
                    "kind": {"const": "function"},
                    "name": {"type": "string"},
                    "line": {"type": "integer", "minimum": 1},
                    "signature": {"$ref": "#/$defs/signature"},
                    "doc": {"type": "string", "description": "First non-empty docstring line"}
                }
            },
            "signature": {
                "type": "object",
                "required": ["parameters"],
                "additionalProperties": false,
                "properties": {
                    "parameters": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["name"],
                            "additionalProperties": false,
                            "properties": {
                                "name": {"type": "string"},
                                "type": {"type": "string"},
                                "default": {"type": "string"}
                            }
                        }
                    },
                    "return_type": {"type": "string"},
                    "async": {"type": "boolean"}
                }
            },
            "class": {
                "type": "object",
                "required": ["kind", "name", "line"],
                "additionalProperties": false,
                "properties": {
                    "kind": {"const": "class"},
                    "name": {"type": "string"},
                    "line": {"type": "integer", "minimum": 1},
                    "bases": {"type": "array", "items": {"type": "string"}},
                    "members": {
                        "type": "object",
                        "additionalProperties": {"$ref": "#/$defs/symbol"}
                    },
                    "member_count": {"type": "integer", "minimum": 0}
                }
            },
            "other": {
                "type": "object",
                "required": ["kind", "name", "line"],
                "additionalProperties": false,
                "properties": {
                    "kind": {"const": "other"},
                    "name": {"type": "string"},
                    "line": {"type": "integer", "minimum": 1}
                }
            }
        });

        if with_hierarchy && let Some(map) = defs.as_object_mut() {
            map.insert(
                "metadata".to_string(),
                json!({
                    "type": "object",
                    "required": ["sources", "level", "generated_at", "version"],
                    "additionalProperties": false,
                    "properties": {
                        "sources": {
                            "type": "array",
                            "description": "Source roots relative to the output directory",
                            "items": {"type": "string"}
                        },
                        "level": {"type": "string", "enum": ["packages", "modules", "classes", "functions"]},
                        "generated_at": {"type": "string", "format": "date-time"},
                        "version": {"type": "string"}
                    }
                }),
            );
            map.insert(
                "entry".to_string(),
                json!({
                    "oneOf": [
                        {"$ref": "#/$defs/package"},
                        {"$ref": "#/$defs/package_link"},
                        {"$ref": "#/$defs/module"}
                    ]
                }),
            );
            map.insert(
                "package".to_string(),
                json!({
                    "type": "object",
                    "required": ["kind", "path"],
                    "additionalProperties": false,
                    "properties": {
                        "kind": {"const": "package"},
                        "path": {"type": "string"},
                        "children": {
                            "type": "object",
                            "additionalProperties": {"$ref": "#/$defs/entry"}
                        },
                        "summary": {
                            "type": "object",
                            "required": ["modules", "symbols"],
                            "additionalProperties": false,
                            "properties": {
                                "modules": {"type": "integer", "minimum": 0},
                                "symbols": {"type": "integer", "minimum": 0}
                            }
                        }
                    }
                }),
            );
            map.insert(
                "package_link".to_string(),
                json!({
                    "type": "object",
                    "description": "Package whose modules live in a separate document",
                    "required": ["kind", "path", "document", "modules"],
                    "additionalProperties": false,
                    "properties": {
                        "kind": {"const": "package"},
                        "path": {"type": "string"},
                        "document": {"type": "string", "description": "Package document relative to this document"},
                        "modules": {"type": "integer", "minimum": 0}
                    }
                }),
            );
        }

        defs
    }
}
