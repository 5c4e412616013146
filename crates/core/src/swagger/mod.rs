//! Loading a Swagger 2.0 document.
//!
//! The pipeline is:
//! 1. Parse: text (JSON or YAML) -> `serde_json::Value`
//! 2. Version gate: reject OpenAPI 3.x, non-2.x Swagger, missing `paths`
//! 3. Validate: structural checks on the raw value
//! 4. Model: `Value` -> `SwaggerSpec`, definitions -> `SchemaNode`

mod schema;
mod spec;
mod validate;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::error::{GenerateError, Result};

pub use schema::{ArrayItems, Primitive, PropertyNode, SchemaNode};
pub use spec::{
    EnumValue, Info, Items, Operation, Parameter, ParameterLocation, ParameterOrRef, PathItem,
    Response, ResponseOrRef, Schema, SchemaType, SecurityRequirement, SecurityScheme,
    SwaggerSpec,
};
pub use validate::validate_document;

use validate::is_extension;

/// A validated Swagger document, ready for generation.
#[derive(Debug, Clone)]
pub struct Document {
    spec: SwaggerSpec,
    definitions: Option<IndexMap<String, SchemaNode>>,
    raw: Value,
}

impl Document {
    /// Parse and validate a document from JSON or YAML text.
    ///
    /// `origin` names the input in error messages.
    pub fn from_text(text: &str, origin: &str) -> Result<Self> {
        let value = parse_text(text, origin)?;
        Self::from_value(value)
    }

    /// Validate an already-parsed document.
    pub fn from_value(raw: Value) -> Result<Self> {
        check_version(&raw)?;

        let findings = validate_document(&raw);
        if !findings.is_empty() {
            return Err(GenerateError::Validation(findings));
        }

        let mut typed = raw.clone();
        if let Some(Value::Object(paths)) = typed.get_mut("paths") {
            paths.retain(|url, _| !is_extension(url));
        }
        let spec: SwaggerSpec = serde_json::from_value(typed)?;
        let definitions = spec.definitions.as_ref().map(|definitions| {
            definitions
                .iter()
                .map(|(name, schema)| (name.clone(), SchemaNode::from_schema(schema)))
                .collect()
        });

        debug!(
            title = %spec.info.title,
            paths = spec.paths.len(),
            definitions = spec.definitions.as_ref().map_or(0, IndexMap::len),
            "Loaded Swagger document."
        );

        Ok(Self {
            spec,
            definitions,
            raw,
        })
    }

    /// Typed view of the document.
    pub fn spec(&self) -> &SwaggerSpec {
        &self.spec
    }

    /// Parsed `definitions`, or `None` when the document declares none.
    pub fn definitions(&self) -> Option<&IndexMap<String, SchemaNode>> {
        self.definitions.as_ref()
    }

    /// The document as parsed, before typing.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Look up a local JSON reference (`#/parameters/limit`) in the raw document.
    pub fn lookup_ref(&self, reference: &str) -> Option<&Value> {
        let pointer = reference.strip_prefix('#')?;
        self.raw.pointer(pointer)
    }
}

/// Parse input text as JSON, falling back to YAML.
pub fn parse_text(text: &str, origin: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Ok(value),
        Err(json_err) => {
            debug!(origin, error = %json_err, "Input is not JSON, trying YAML.");
            serde_yaml::from_str::<serde_yaml::Value>(text)
                .ok()
                .and_then(yaml_to_json)
                .filter(Value::is_object)
                .ok_or_else(|| GenerateError::InvalidFormat(origin.to_string()))
        }
    }
}

/// Convert YAML into JSON, stringifying non-string keys (`200:` -> `"200"`).
fn yaml_to_json(value: serde_yaml::Value) -> Option<Value> {
    use serde_yaml::Value as Yaml;

    Some(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                serde_json::Number::from_f64(n.as_f64()?).map_or(Value::Null, Value::Number)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect::<Option<_>>()?)
        }
        Yaml::Mapping(mapping) => {
            let mut object = serde_json::Map::new();
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    _ => return None,
                };
                object.insert(key, yaml_to_json(value)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

/// Reject documents this generator cannot handle.
pub fn check_version(document: &Value) -> Result<()> {
    if let Some(openapi) = document.get("openapi") {
        let version = openapi
            .as_str()
            .map_or_else(|| openapi.to_string(), str::to_string);
        return Err(GenerateError::UnsupportedOpenApi(version));
    }

    match document.get("swagger") {
        Some(Value::String(version)) if version.starts_with("2.") => {}
        Some(Value::String(version)) => {
            return Err(GenerateError::UnsupportedVersion(Some(version.clone())));
        }
        Some(other) => return Err(GenerateError::UnsupportedVersion(Some(other.to_string()))),
        None => return Err(GenerateError::UnsupportedVersion(None)),
    }

    if document.get("paths").is_none() {
        return Err(GenerateError::MissingPaths);
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    const PETS_JSON: &str = r##"{
  "swagger": "2.0",
  "info": { "title": "Pets", "version": "1.0.0" },
  "paths": {
    "/pets": { "get": { "responses": { "200": { "description": "OK", "schema": { "$ref": "#/definitions/Pet" } } } } }
  },
  "parameters": {
    "limit": { "name": "limit", "in": "query", "type": "integer" }
  },
  "definitions": {
    "Pet": { "type": "object", "properties": { "name": { "type": "string" } } },
    "Owner": { "type": "object", "properties": { "pets": { "type": "array", "items": { "$ref": "#/definitions/Pet" } } } }
  }
}"##;

    const PETS_YAML: &str = r#"
swagger: "2.0"
info:
  title: Pets
  version: 1.0.0
paths:
  /pets:
    get:
      responses:
        200:
          description: OK
definitions:
  Zebra:
    type: string
  Aardvark:
    type: number
"#;

    #[test]
    fn test_loads_json_document() {
        let document = Document::from_text(PETS_JSON, "pets.json").unwrap();
        assert_eq!(document.spec().info.title, "Pets");
        let names: Vec<_> = document.definitions().unwrap().keys().cloned().collect();
        assert_eq!(names, ["Pet", "Owner"]);
    }

    #[test]
    fn test_loads_yaml_document_in_declaration_order() {
        let document = Document::from_text(PETS_YAML, "pets.yaml").unwrap();
        let names: Vec<_> = document.definitions().unwrap().keys().cloned().collect();
        assert_eq!(names, ["Zebra", "Aardvark"]);
        assert_eq!(
            document.definitions().unwrap()["Zebra"],
            SchemaNode::Primitive(Primitive::String)
        );
    }

    #[test]
    fn test_rejects_garbage() {
        let err = Document::from_text("{ not: [valid", "broken.txt").unwrap_err();
        assert!(matches!(err, GenerateError::InvalidFormat(origin) if origin == "broken.txt"));

        let err = Document::from_text("just a string", "scalar.yaml").unwrap_err();
        assert!(matches!(err, GenerateError::InvalidFormat(_)));
    }

    #[test]
    fn test_rejects_openapi_3() {
        let err = Document::from_text(
            r#"{ "openapi": "3.0.0", "info": { "title": "x", "version": "1" }, "paths": {} }"#,
            "v3.json",
        )
        .unwrap_err();
        assert!(matches!(err, GenerateError::UnsupportedOpenApi(v) if v == "3.0.0"));
    }

    #[test]
    fn test_rejects_other_swagger_versions() {
        let err = Document::from_text(r#"{ "swagger": "1.2", "paths": {} }"#, "old.json")
            .unwrap_err();
        assert!(matches!(err, GenerateError::UnsupportedVersion(Some(v)) if v == "1.2"));

        let err = Document::from_text(r#"{ "paths": {} }"#, "none.json").unwrap_err();
        assert!(matches!(err, GenerateError::UnsupportedVersion(None)));
    }

    #[test]
    fn test_rejects_missing_paths() {
        let err = Document::from_text(
            r#"{ "swagger": "2.0", "info": { "title": "x", "version": "1" } }"#,
            "nopaths.json",
        )
        .unwrap_err();
        assert!(matches!(err, GenerateError::MissingPaths));
    }

    #[test]
    fn test_validation_errors_are_fatal() {
        let err = Document::from_text(r#"{ "swagger": "2.0", "paths": {} }"#, "noinfo.json")
            .unwrap_err();
        let GenerateError::Validation(findings) = err else {
            panic!("expected validation error");
        };
        assert_eq!(findings, vec!["info is required"]);
    }

    #[test]
    fn test_path_extensions_are_not_paths() {
        let document = Document::from_text(
            r#"{ "swagger": "2.0", "info": { "title": "x", "version": "1" },
                 "paths": {
                   "x-generated-by": { "tool": "gateway" },
                   "/pets": { "get": { "responses": {} } },
                   "x-version": 3
                 } }"#,
            "ext.json",
        )
        .unwrap();
        let urls: Vec<_> = document.spec().paths.keys().cloned().collect();
        assert_eq!(urls, ["/pets"]);
        assert_eq!(document.raw()["paths"]["x-version"], 3);
    }

    #[test]
    fn test_lookup_ref() {
        let document = Document::from_text(PETS_JSON, "pets.json").unwrap();
        let limit = document.lookup_ref("#/parameters/limit").unwrap();
        assert_eq!(limit["name"], "limit");
        assert!(document.lookup_ref("#/parameters/missing").is_none());
        assert!(document.lookup_ref("other.json#/x").is_none());
    }
}
