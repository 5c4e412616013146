//! Schema nodes: the shape of a raw `Schema` decided once, up front.
//!
//! The raw serde struct allows any combination of `$ref`, `allOf`, `enum`,
//! `type`, `properties` and `items`. `SchemaNode::from_schema` picks the one
//! interpretation that wins (`$ref` > `allOf` > `enum` > `type`) so the type
//! resolver can match exhaustively instead of sniffing fields in order.

use indexmap::IndexMap;

use super::spec::{EnumValue, Items, Schema};

/// Parsed schema shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// `$ref` target, verbatim.
    Reference(String),
    /// `allOf` branches.
    Composite(Vec<SchemaNode>),
    /// Enumerated literal values in declaration order.
    Enum(Vec<EnumValue>),
    /// Scalar type.
    Primitive(Primitive),
    /// Object type. `properties` is `None` when the schema declares none.
    Object {
        /// Declared properties in input order.
        properties: Option<IndexMap<String, PropertyNode>>,
        /// Names listed in `required`.
        required: Vec<String>,
    },
    /// Array type. `None` when `items` is absent.
    Array(Option<ArrayItems>),
    /// A `type` value that is not understood (`file`, `null`, typos, ...).
    Unknown(String),
}

/// Scalar Swagger types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// `string`
    String,
    /// `number`
    Number,
    /// `integer`
    Integer,
    /// `boolean`
    Boolean,
}

/// An object property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyNode {
    /// Property schema.
    pub node: SchemaNode,
    /// `readOnly: true` on the property schema.
    pub read_only: bool,
}

/// Array item shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayItems {
    /// One schema for every element.
    Single(Box<SchemaNode>),
    /// Positional schemas.
    Tuple(Vec<SchemaNode>),
}

impl Primitive {
    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "string" => Some(Primitive::String),
            "number" => Some(Primitive::Number),
            "integer" => Some(Primitive::Integer),
            "boolean" => Some(Primitive::Boolean),
            _ => None,
        }
    }
}

impl SchemaNode {
    /// Decide the shape of a raw schema, recursively.
    pub fn from_schema(schema: &Schema) -> Self {
        if let Some(reference) = &schema.ref_path {
            return SchemaNode::Reference(reference.clone());
        }

        if let Some(all_of) = &schema.all_of {
            return SchemaNode::Composite(all_of.iter().map(SchemaNode::from_schema).collect());
        }

        if let Some(values) = &schema.enum_values {
            return SchemaNode::Enum(values.clone());
        }

        // A missing type means "object", the same as Swagger tooling assumes.
        let type_name = schema
            .schema_type
            .as_ref()
            .and_then(|t| t.primary())
            .unwrap_or("object");

        if let Some(primitive) = Primitive::parse(type_name) {
            return SchemaNode::Primitive(primitive);
        }

        match type_name.to_ascii_lowercase().as_str() {
            "object" => SchemaNode::Object {
                properties: schema.properties.as_ref().map(|properties| {
                    properties
                        .iter()
                        .map(|(name, property)| {
                            (
                                name.clone(),
                                PropertyNode {
                                    node: SchemaNode::from_schema(property),
                                    read_only: property.read_only,
                                },
                            )
                        })
                        .collect()
                }),
                required: schema.required.clone(),
            },
            "array" => SchemaNode::Array(schema.items.as_ref().map(|items| match items {
                Items::Single(item) => ArrayItems::Single(Box::new(SchemaNode::from_schema(item))),
                Items::Tuple(items) => {
                    ArrayItems::Tuple(items.iter().map(SchemaNode::from_schema).collect())
                }
            })),
            _ => SchemaNode::Unknown(type_name.to_string()),
        }
    }
}

impl From<&Schema> for SchemaNode {
    fn from(schema: &Schema) -> Self {
        SchemaNode::from_schema(schema)
    }
}
