//! Swagger 2.0 specification structs for serde deserialization.
//!
//! Only the subset needed to produce TypeScript code is modelled. Maps use
//! `IndexMap` so that declaration order in the input survives: paths drive
//! the order of generated resources and properties the order of fields.

use indexmap::IndexMap;
use serde::Deserialize;

/// Root Swagger specification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerSpec {
    /// Declared Swagger version (`2.0`).
    pub swagger: String,
    /// API metadata.
    pub info: Info,
    /// URL pattern → operations.
    pub paths: IndexMap<String, PathItem>,
    /// Reusable schemas.
    pub definitions: Option<IndexMap<String, Schema>>,
    /// Reusable responses, addressed as `#/responses/<name>`.
    #[serde(default)]
    pub responses: IndexMap<String, ResponseOrRef>,
    /// Named security schemes.
    #[serde(default)]
    pub security_definitions: IndexMap<String, SecurityScheme>,
    /// Document-wide security requirements.
    #[serde(default)]
    pub security: Vec<SecurityRequirement>,
}

/// API metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// API description.
    pub description: Option<String>,
}

/// A path item containing operations for the HTTP verbs Swagger knows.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    /// GET operation.
    pub get: Option<Operation>,
    /// PUT operation.
    pub put: Option<Operation>,
    /// POST operation.
    pub post: Option<Operation>,
    /// DELETE operation.
    pub delete: Option<Operation>,
    /// OPTIONS operation.
    pub options: Option<Operation>,
    /// HEAD operation.
    pub head: Option<Operation>,
    /// PATCH operation.
    pub patch: Option<Operation>,
    /// Path-level parameters shared by all operations.
    #[serde(default)]
    pub parameters: Vec<ParameterOrRef>,
}

/// An API operation (endpoint).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Explicit method name.
    pub operation_id: Option<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Longer description.
    pub description: Option<String>,
    /// Operation parameters.
    #[serde(default)]
    pub parameters: Vec<ParameterOrRef>,
    /// Status code → response.
    #[serde(default)]
    pub responses: IndexMap<String, ResponseOrRef>,
    /// Security requirements overriding the document-wide ones.
    pub security: Option<Vec<SecurityRequirement>>,
}

/// A parameter given inline or as a `$ref`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ParameterOrRef {
    /// `{ "$ref": "#/parameters/..." }`
    Ref {
        /// Reference target.
        #[serde(rename = "$ref")]
        reference: String,
    },
    /// Inline parameter object.
    Inline(Box<Parameter>),
}

/// A parameter (path, query, header, body or formData).
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Location.
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Human description.
    pub description: Option<String>,
    /// Whether the parameter is mandatory.
    #[serde(default)]
    pub required: bool,
    /// Primitive type for non-body parameters.
    #[serde(rename = "type")]
    pub param_type: Option<String>,
    /// Schema for body parameters.
    pub schema: Option<Schema>,
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    /// Templated path segment.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Request body.
    Body,
    /// Form field.
    FormData,
}

/// A response given inline or as a `$ref`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResponseOrRef {
    /// `{ "$ref": "#/responses/..." }`
    Ref {
        /// Reference target.
        #[serde(rename = "$ref")]
        reference: String,
    },
    /// Inline response object.
    Inline(Box<Response>),
}

/// A response definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    /// Human description.
    #[serde(default)]
    pub description: String,
    /// Response body schema.
    pub schema: Option<Schema>,
}

/// A security scheme from `securityDefinitions`.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityScheme {
    /// `basic`, `apiKey` or `oauth2`.
    #[serde(rename = "type")]
    pub scheme_type: String,
    /// Header or query parameter name for `apiKey` schemes.
    pub name: Option<String>,
    /// `header` or `query` for `apiKey` schemes.
    #[serde(rename = "in")]
    pub location: Option<String>,
}

/// Scheme name → scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// JSON Schema subset used by Swagger 2.0.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Reference to another schema.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    /// The type of the schema (string, number, integer, boolean, object, array).
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,

    /// Properties for object types.
    pub properties: Option<IndexMap<String, Schema>>,

    /// Required property names for object types.
    #[serde(default)]
    pub required: Vec<String>,

    /// Item schema (or tuple of schemas) for array types.
    pub items: Option<Items>,

    /// Enum values.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<EnumValue>>,

    /// Intersection type (all of these schemas combined).
    pub all_of: Option<Vec<Schema>>,

    /// Read-only property marker.
    #[serde(default)]
    pub read_only: bool,

    /// Format hint (e.g., date-time, uuid).
    pub format: Option<String>,

    /// Human description.
    pub description: Option<String>,
}

/// Schema type can be a single type or an array of types.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// `"type": "string"`
    Single(String),
    /// `"type": ["string", "null"]`
    Multiple(Vec<String>),
}

/// Array items: a single schema or a tuple of schemas.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Items {
    /// `"items": [{...}, {...}]`
    Tuple(Vec<Schema>),
    /// `"items": {...}`
    Single(Box<Schema>),
}

/// Enum value can be string, integer, float, boolean, or null.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    /// String literal.
    String(String),
    /// Integer literal.
    Integer(i64),
    /// Floating point literal.
    Float(f64),
    /// Boolean literal.
    Bool(bool),
    /// `null`
    Null,
}

impl SchemaType {
    /// First declared type name.
    pub fn primary(&self) -> Option<&str> {
        match self {
            SchemaType::Single(t) => Some(t.as_str()),
            SchemaType::Multiple(types) => types.first().map(String::as_str),
        }
    }
}

impl Operation {
    /// Security requirements that apply to this operation.
    pub fn effective_security<'a>(
        &'a self,
        spec: &'a SwaggerSpec,
    ) -> &'a [SecurityRequirement] {
        self.security.as_deref().unwrap_or(&spec.security)
    }
}
