//! TypeScript type AST and its emission via the `Emit` trait.
//!
//! Only the type-level subset the generated clients need is modelled:
//! primitives, `Array<T>`, unions, intersections, object literals,
//! literal types and named references.

use super::naming::{escape_js_string, quote_if_needed};

/// Trait for emitting TypeScript code from AST nodes.
pub trait Emit {
    /// Convert the AST node to its TypeScript string representation.
    fn emit(&self) -> String;
}

/// TypeScript type representation
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    /// Primitive types: string, number, boolean, any, void
    Primitive(TsPrimitive),
    /// Array type: `Array<T>`
    Array(Box<TsType>),
    /// Union type: A | B | C
    Union(Vec<TsType>),
    /// Intersection type: A & B & C
    Intersection(Vec<TsType>),
    /// Object type: `{ foo: string; bar?: number }`, `{}` when empty
    Object(Vec<TsProp>),
    /// Literal type: "foo", 42, true
    Literal(TsLiteral),
    /// Named type reference
    Ref(String),
}

/// TypeScript primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    /// `string`
    String,
    /// `number`, for both `number` and `integer`
    Number,
    /// `boolean`
    Boolean,
    /// `any`
    Any,
    /// `void`, only used as a return type
    Void,
}

/// Object property definition
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    /// Property name as declared, quoted on output when needed
    pub name: String,
    /// Property type
    pub ty: TsType,
    /// Emitted with `?`
    pub optional: bool,
    /// Emitted with `readonly`
    pub readonly: bool,
}

/// TypeScript literal values
#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    /// Double-quoted string literal
    String(String),
    /// Floating point literal
    Number(f64),
    /// Integer literal
    Int(i64),
    /// `true` or `false`
    Bool(bool),
    /// `null`
    Null,
}

impl TsType {
    /// The empty object type `{}`, used as the fallback for anything that
    /// cannot be typed more precisely.
    pub fn empty_object() -> Self {
        TsType::Object(Vec::new())
    }

    /// Check if this is an object literal type (including `{}`).
    pub fn is_object_literal(&self) -> bool {
        matches!(self, TsType::Object(_))
    }
}

// =============================================================================
// Emission
// =============================================================================

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        match self {
            TsPrimitive::String => "string".to_string(),
            TsPrimitive::Number => "number".to_string(),
            TsPrimitive::Boolean => "boolean".to_string(),
            TsPrimitive::Any => "any".to_string(),
            TsPrimitive::Void => "void".to_string(),
        }
    }
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => format!("\"{}\"", escape_js_string(s)),
            TsLiteral::Number(n) => n.to_string(),
            TsLiteral::Int(i) => i.to_string(),
            TsLiteral::Bool(b) => b.to_string(),
            TsLiteral::Null => "null".to_string(),
        }
    }
}

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Array(inner) => format!("Array<{}>", inner.emit()),
            TsType::Union(types) => types.iter().map(Emit::emit).collect::<Vec<_>>().join(" | "),
            TsType::Intersection(types) => types
                .iter()
                .map(|t| {
                    let s = t.emit();
                    if matches!(t, TsType::Union(members) if members.len() > 1) {
                        format!("({s})")
                    } else {
                        s
                    }
                })
                .collect::<Vec<_>>()
                .join(" & "),
            TsType::Object(props) => {
                if props.is_empty() {
                    "{}".to_string()
                } else {
                    let parts: Vec<_> = props.iter().map(Emit::emit).collect();
                    format!("{{ {} }}", parts.join("; "))
                }
            }
            TsType::Literal(lit) => lit.emit(),
            TsType::Ref(name) => name.clone(),
        }
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        let readonly = if self.readonly { "readonly " } else { "" };
        let key = quote_if_needed(&self.name);
        let opt = if self.optional { "?" } else { "" };
        format!("{readonly}{key}{opt}: {}", self.ty.emit())
    }
}
