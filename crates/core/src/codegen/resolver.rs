//! Schema to TypeScript type resolution.
//!
//! `TypeResolver::resolve` maps a [`SchemaNode`] onto a [`ResolvedType`]:
//! the type AST plus the set of definition names the type depends on.
//! Resolution is pure. Callers union the import sets of the types they
//! combine; nothing is accumulated behind their back.
//!
//! References are never inlined. A `$ref` into `definitions` resolves to the
//! definition's name and records it as an import, so self-referencing and
//! mutually-referencing definitions terminate after one level.
//!
//! Problems with the input are never errors here. The affected type falls
//! back to `{}` (or `Array<any>`), a `tracing` event is emitted and the
//! result is marked as degraded.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use tracing::{info, warn};

use super::naming::sanitize_definition_name;
use super::types::{Emit, TsLiteral, TsPrimitive, TsProp, TsType};
use crate::swagger::{ArrayItems, Document, EnumValue, Primitive, SchemaNode};

const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// How a type should be declared when it is given a name of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BasicType {
    /// `export interface X { ... }`
    Interface,
    /// `export type X = ...;`
    #[default]
    Type,
}

/// A resolved type expression and the definitions it depends on.
#[derive(Debug, Clone)]
pub struct ResolvedType {
    /// Type AST.
    pub ty: TsType,
    /// Sanitized names of referenced definitions.
    pub imports: BTreeSet<String>,
    /// Classification, `None` when the type does not establish one
    /// (references).
    pub basic_type: Option<BasicType>,
    /// Set when a fallback was taken anywhere inside this type.
    pub degraded: bool,
}

impl PartialEq for ResolvedType {
    fn eq(&self, other: &Self) -> bool {
        self.expression() == other.expression() && self.imports == other.imports
    }
}

impl Eq for ResolvedType {}

impl ResolvedType {
    fn new(ty: TsType, basic_type: Option<BasicType>) -> Self {
        Self {
            ty,
            imports: BTreeSet::new(),
            basic_type,
            degraded: false,
        }
    }

    fn degraded(ty: TsType) -> Self {
        Self {
            ty,
            imports: BTreeSet::new(),
            basic_type: Some(BasicType::Type),
            degraded: true,
        }
    }

    /// A `string`/`number`/`boolean` type without imports.
    pub fn primitive(primitive: TsPrimitive) -> Self {
        Self::new(TsType::Primitive(primitive), Some(BasicType::Type))
    }

    /// The `{}` fallback type.
    pub fn empty_object() -> Self {
        Self::new(TsType::empty_object(), Some(BasicType::Type))
    }

    /// Combine types with ` | `, unioning their imports.
    ///
    /// A single type is returned unchanged.
    pub fn union(mut types: Vec<ResolvedType>) -> Option<Self> {
        if types.len() <= 1 {
            return types.pop();
        }
        let mut combined = Self::new(TsType::Union(Vec::new()), Some(BasicType::Type));
        let mut members = Vec::with_capacity(types.len());
        for resolved in types {
            combined.absorb(&resolved);
            members.push(resolved.ty);
        }
        combined.ty = TsType::Union(members);
        Some(combined)
    }

    /// Printable TypeScript type expression.
    pub fn expression(&self) -> String {
        self.ty.emit()
    }

    /// Classification, defaulting to `type` for types that establish none.
    pub fn basic_type(&self) -> BasicType {
        self.basic_type.unwrap_or_default()
    }

    fn absorb(&mut self, other: &ResolvedType) {
        self.imports.extend(other.imports.iter().cloned());
        self.degraded |= other.degraded;
    }
}

/// Resolves schema nodes against a document's `definitions`.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'a> {
    definitions: Option<&'a IndexMap<String, SchemaNode>>,
}

impl<'a> TypeResolver<'a> {
    /// Resolver for the given definitions (`None` if the document has none).
    pub fn new(definitions: Option<&'a IndexMap<String, SchemaNode>>) -> Self {
        Self { definitions }
    }

    /// Resolver for a loaded document.
    pub fn for_document(document: &'a Document) -> Self {
        Self::new(document.definitions())
    }

    /// Resolve a schema node.
    ///
    /// `context` names the schema in log output (a definition name, a
    /// parameter name, `GET /pets 200`, ...).
    pub fn resolve(&self, node: &SchemaNode, context: &str) -> ResolvedType {
        match node {
            SchemaNode::Reference(reference) => self.resolve_reference(reference, context),
            SchemaNode::Composite(branches) => self.resolve_composite(branches, context),
            SchemaNode::Enum(values) => resolve_enum(values, context),
            SchemaNode::Primitive(primitive) => ResolvedType::primitive(match primitive {
                Primitive::String => TsPrimitive::String,
                Primitive::Boolean => TsPrimitive::Boolean,
                Primitive::Integer | Primitive::Number => TsPrimitive::Number,
            }),
            SchemaNode::Object {
                properties,
                required,
            } => match properties {
                Some(properties) if !properties.is_empty() => {
                    let mut resolved = ResolvedType::new(
                        TsType::Object(Vec::with_capacity(properties.len())),
                        Some(BasicType::Interface),
                    );
                    let mut props = Vec::with_capacity(properties.len());
                    for (name, property) in properties {
                        let property_type = self.resolve(&property.node, name);
                        resolved.absorb(&property_type);
                        props.push(TsProp {
                            name: name.clone(),
                            ty: property_type.ty,
                            optional: !required.contains(name),
                            readonly: property.read_only,
                        });
                    }
                    resolved.ty = TsType::Object(props);
                    resolved
                }
                _ => {
                    warn!(
                        schema = context,
                        "Schema type is \"object\" but has no properties, using {{}}."
                    );
                    let mut resolved = ResolvedType::degraded(TsType::empty_object());
                    resolved.basic_type = Some(BasicType::Interface);
                    resolved
                }
            },
            SchemaNode::Array(items) => match items {
                None => {
                    warn!(
                        schema = context,
                        "Schema type is \"array\" but has no items, using Array<any>."
                    );
                    ResolvedType::degraded(TsType::Array(Box::new(TsType::Primitive(
                        TsPrimitive::Any,
                    ))))
                }
                Some(ArrayItems::Single(item)) => {
                    let item = self.resolve(item, context);
                    let mut resolved = ResolvedType::new(
                        TsType::Array(Box::new(item.ty.clone())),
                        Some(BasicType::Type),
                    );
                    resolved.absorb(&item);
                    resolved
                }
                Some(ArrayItems::Tuple(items)) => {
                    let items: Vec<_> = items.iter().map(|i| self.resolve(i, context)).collect();
                    let mut resolved =
                        ResolvedType::new(TsType::Array(Box::new(TsType::Union(Vec::new()))), Some(BasicType::Type));
                    let mut members = Vec::with_capacity(items.len());
                    for item in items {
                        resolved.absorb(&item);
                        members.push(item.ty);
                    }
                    let inner = if members.is_empty() {
                        warn!(
                            schema = context,
                            "Array schema has an empty items list, using Array<any>."
                        );
                        resolved.degraded = true;
                        TsType::Primitive(TsPrimitive::Any)
                    } else if members.len() == 1 {
                        members.remove(0)
                    } else {
                        TsType::Union(members)
                    };
                    resolved.ty = TsType::Array(Box::new(inner));
                    resolved
                }
            },
            SchemaNode::Unknown(type_name) => {
                warn!(
                    schema = context,
                    type_name = %type_name,
                    "Unrecognized schema type, using {{}}."
                );
                ResolvedType::degraded(TsType::empty_object())
            }
        }
    }

    fn resolve_reference(&self, reference: &str, context: &str) -> ResolvedType {
        let Some(raw_name) = reference.strip_prefix(DEFINITIONS_PREFIX) else {
            warn!(
                schema = context,
                reference, "Invalid reference, only \"#/definitions/\" is supported. Using {{}}."
            );
            return ResolvedType::degraded(TsType::empty_object());
        };

        let Some(definitions) = self.definitions else {
            info!(
                schema = context,
                reference, "Spec has no definitions, using {{}}."
            );
            return ResolvedType::degraded(TsType::empty_object());
        };

        let name = raw_name.replace("~1", "/").replace("~0", "~");
        if !definitions.contains_key(&name) {
            warn!(
                schema = context,
                reference, "No definition found for reference, using {{}}."
            );
            return ResolvedType::degraded(TsType::empty_object());
        }

        let type_name = sanitize_definition_name(&name);
        let mut resolved = ResolvedType::new(TsType::Ref(type_name.clone()), None);
        resolved.imports.insert(type_name);
        resolved
    }

    fn resolve_composite(&self, branches: &[SchemaNode], context: &str) -> ResolvedType {
        let branches: Vec<_> = branches.iter().map(|b| self.resolve(b, context)).collect();

        let basic_type = branches.iter().find_map(|b| b.basic_type);
        let mut resolved = ResolvedType::new(TsType::Intersection(Vec::new()), basic_type);
        let mut members = Vec::with_capacity(branches.len());
        for branch in branches {
            resolved.absorb(&branch);
            members.push(branch.ty);
        }

        resolved.ty = match members.len() {
            0 => {
                warn!(schema = context, "Schema has an empty \"allOf\", using {{}}.");
                resolved.degraded = true;
                TsType::empty_object()
            }
            1 => members.remove(0),
            _ => TsType::Intersection(members),
        };
        resolved
    }
}

fn resolve_enum(values: &[EnumValue], context: &str) -> ResolvedType {
    let mut literals: Vec<TsType> = values
        .iter()
        .map(|value| {
            TsType::Literal(match value {
                EnumValue::String(s) => TsLiteral::String(s.clone()),
                EnumValue::Integer(n) => TsLiteral::Int(*n),
                EnumValue::Float(f) => TsLiteral::Number(*f),
                EnumValue::Bool(b) => TsLiteral::Bool(*b),
                EnumValue::Null => TsLiteral::Null,
            })
        })
        .collect();

    match literals.len() {
        0 => {
            warn!(schema = context, "Schema has an empty \"enum\", using {{}}.");
            ResolvedType::degraded(TsType::empty_object())
        }
        1 => ResolvedType::new(literals.remove(0), Some(BasicType::Type)),
        _ => ResolvedType::new(TsType::Union(literals), Some(BasicType::Type)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::swagger::Schema;

    fn node(json: &str) -> SchemaNode {
        let schema: Schema = serde_json::from_str(json).unwrap();
        SchemaNode::from_schema(&schema)
    }

    fn definitions(json: &str) -> IndexMap<String, SchemaNode> {
        let raw: IndexMap<String, Schema> = serde_json::from_str(json).unwrap();
        raw.iter()
            .map(|(name, schema)| (name.clone(), SchemaNode::from_schema(schema)))
            .collect()
    }

    fn imports(resolved: &ResolvedType) -> Vec<&str> {
        resolved.imports.iter().map(String::as_str).collect()
    }

    // =========================================================================
    // Primitives and enums
    // =========================================================================

    #[test]
    fn test_primitives() {
        let resolver = TypeResolver::new(None);
        for (json, expected) in [
            (r#"{ "type": "string" }"#, "string"),
            (r#"{ "type": "boolean" }"#, "boolean"),
            (r#"{ "type": "integer" }"#, "number"),
            (r#"{ "type": "number" }"#, "number"),
        ] {
            let resolved = resolver.resolve(&node(json), "x");
            assert_eq!(resolved.expression(), expected);
            assert!(resolved.imports.is_empty());
            assert!(!resolved.degraded);
        }
    }

    #[test]
    fn test_unknown_type_degrades_to_empty_object() {
        let resolved = TypeResolver::new(None).resolve(&node(r#"{ "type": "file" }"#), "upload");
        assert_eq!(resolved.expression(), "{}");
        assert!(resolved.degraded);
    }

    #[test]
    fn test_enum_is_union_of_literals_in_order() {
        let resolver = TypeResolver::new(None);
        let resolved = resolver.resolve(
            &node(r#"{ "type": "string", "enum": ["off", "on", "auto"] }"#),
            "mode",
        );
        assert_eq!(resolved.expression(), "\"off\" | \"on\" | \"auto\"");
        assert!(resolved.imports.is_empty());

        let mixed = resolver.resolve(&node(r#"{ "enum": [1, 2.5, true, null] }"#), "mixed");
        assert_eq!(mixed.expression(), "1 | 2.5 | true | null");

        let single = resolver.resolve(&node(r#"{ "enum": ["only"] }"#), "single");
        assert_eq!(single.expression(), "\"only\"");
    }

    // =========================================================================
    // Objects
    // =========================================================================

    #[test]
    fn test_object_required_and_optional_in_declaration_order() {
        let resolved = TypeResolver::new(None).resolve(
            &node(
                r#"{
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "tag": { "type": "string" },
                        "name": { "type": "string" },
                        "id": { "type": "integer", "readOnly": true },
                        "content-type": { "type": "string" }
                    }
                }"#,
            ),
            "Pet",
        );
        assert_eq!(
            resolved.expression(),
            "{ tag?: string; name: string; readonly id?: number; \"content-type\"?: string }"
        );
        assert_eq!(resolved.basic_type(), BasicType::Interface);
        assert!(!resolved.degraded);
    }

    #[test]
    fn test_object_without_properties_degrades() {
        let resolver = TypeResolver::new(None);
        let resolved = resolver.resolve(&node(r#"{ "type": "object" }"#), "Blob");
        assert_eq!(resolved.expression(), "{}");
        assert!(resolved.degraded);

        let nested = resolver.resolve(
            &node(r#"{ "properties": { "archive": { "type": "object" }, "conversationId": { "type": "string" } }, "required": ["archive", "conversationId"] }"#),
            "body",
        );
        assert_eq!(nested.expression(), "{ archive: {}; conversationId: string }");
        assert!(nested.degraded);
    }

    // =========================================================================
    // Arrays
    // =========================================================================

    #[test]
    fn test_arrays() {
        let defs = definitions(r#"{ "Pet": { "type": "object", "properties": { "name": { "type": "string" } } } }"#);
        let resolver = TypeResolver::new(Some(&defs));

        let missing = resolver.resolve(&node(r#"{ "type": "array" }"#), "list");
        assert_eq!(missing.expression(), "Array<any>");
        assert!(missing.degraded);

        let single = resolver.resolve(
            &node(r##"{ "type": "array", "items": { "$ref": "#/definitions/Pet" } }"##),
            "list",
        );
        assert_eq!(single.expression(), "Array<Pet>");
        assert_eq!(imports(&single), ["Pet"]);

        let tuple = resolver.resolve(
            &node(r##"{ "type": "array", "items": [{ "type": "string" }, { "$ref": "#/definitions/Pet" }] }"##),
            "pair",
        );
        assert_eq!(tuple.expression(), "Array<string | Pet>");
        assert_eq!(imports(&tuple), ["Pet"]);
    }

    // =========================================================================
    // References and composition
    // =========================================================================

    #[test]
    fn test_reference_is_never_inlined() {
        let defs = definitions(
            r##"{ "Node": { "type": "object", "properties": { "children": { "type": "array", "items": { "$ref": "#/definitions/Node" } }, "parent": { "$ref": "#/definitions/Node" } } } }"##,
        );
        let resolver = TypeResolver::new(Some(&defs));
        let resolved = resolver.resolve(&defs["Node"], "Node");
        assert_eq!(
            resolved.expression(),
            "{ children?: Array<Node>; parent?: Node }"
        );
        assert_eq!(imports(&resolved), ["Node"]);
    }

    #[test]
    fn test_reference_fallbacks() {
        let defs = definitions(r#"{ "Pet": { "type": "string" } }"#);

        let no_definitions = TypeResolver::new(None)
            .resolve(&node(r##"{ "$ref": "#/definitions/Pet" }"##), "x");
        assert_eq!(no_definitions.expression(), "{}");
        assert!(no_definitions.imports.is_empty());
        assert!(no_definitions.degraded);

        let resolver = TypeResolver::new(Some(&defs));
        let external = resolver.resolve(&node(r##"{ "$ref": "other.json#/Pet" }"##), "x");
        assert_eq!(external.expression(), "{}");
        assert!(external.degraded);

        let dangling = resolver.resolve(&node(r##"{ "$ref": "#/definitions/Missing" }"##), "x");
        assert_eq!(dangling.expression(), "{}");
        assert!(dangling.degraded);
    }

    #[test]
    fn test_reference_names_are_sanitized() {
        let defs = definitions(r#"{ "Foo.Bar": { "type": "string" } }"#);
        let resolved = TypeResolver::new(Some(&defs))
            .resolve(&node(r##"{ "$ref": "#/definitions/Foo.Bar" }"##), "x");
        assert_eq!(resolved.expression(), "Foo_Bar");
        assert_eq!(imports(&resolved), ["Foo_Bar"]);
    }

    #[test]
    fn test_all_of_intersects_and_unions_imports() {
        let defs = definitions(
            r#"{ "Base": { "type": "object", "properties": { "id": { "type": "string" } } }, "Extra": { "type": "string" } }"#,
        );
        let resolved = TypeResolver::new(Some(&defs)).resolve(
            &node(
                r##"{ "allOf": [
                    { "$ref": "#/definitions/Base" },
                    { "$ref": "#/definitions/Extra" },
                    { "type": "object", "properties": { "name": { "type": "string" } } }
                ] }"##,
            ),
            "Derived",
        );
        assert_eq!(resolved.expression(), "Base & Extra & { name?: string }");
        assert_eq!(imports(&resolved), ["Base", "Extra"]);
        assert_eq!(resolved.basic_type(), BasicType::Interface);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let defs = definitions(
            r##"{ "Pet": { "type": "object", "required": ["name"], "properties": { "name": { "type": "string" }, "owner": { "$ref": "#/definitions/Owner" } } }, "Owner": { "type": "string" } }"##,
        );
        let resolver = TypeResolver::new(Some(&defs));
        let first = resolver.resolve(&defs["Pet"], "Pet");
        let second = resolver.resolve(&defs["Pet"], "Pet");
        assert_eq!(first, second);
        assert_eq!(first.expression(), "{ name: string; owner?: Owner }");
    }

    #[test]
    fn test_union_of_resolved_types() {
        let defs = definitions(r#"{ "A": { "type": "string" }, "B": { "type": "string" } }"#);
        let resolver = TypeResolver::new(Some(&defs));
        let a = resolver.resolve(&node(r##"{ "$ref": "#/definitions/A" }"##), "x");
        let b = resolver.resolve(&node(r##"{ "$ref": "#/definitions/B" }"##), "x");

        let union = ResolvedType::union(vec![a.clone(), b]).unwrap();
        assert_eq!(union.expression(), "A | B");
        assert_eq!(imports(&union), ["A", "B"]);

        assert_eq!(ResolvedType::union(vec![a.clone()]), Some(a));
        assert_eq!(ResolvedType::union(Vec::new()), None);
    }
}
