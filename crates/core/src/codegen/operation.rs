//! Operation descriptors: one per (URL, HTTP verb).
//!
//! A descriptor is everything the resource template needs to print a single
//! method: its name, parameter lists, return type, URL expression and
//! imports. Descriptors are built once and never mutated afterwards.

use std::collections::{BTreeSet, HashSet};

use serde_json::Value;
use tracing::{debug, warn};

use super::naming::{
    add_stars_to_newline, needs_bracket_notation, normalize_url, pascal_case,
    sanitize_ts_identifier,
};
use super::resolver::{ResolvedType, TypeResolver};
use super::types::{Emit, TsPrimitive};
use crate::swagger::{
    Document, Operation, Parameter, ParameterLocation, ParameterOrRef, PathItem, Response,
    ResponseOrRef, SchemaNode,
};

/// HTTP verbs a Swagger path item can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `get`
    Get,
    /// `put`
    Put,
    /// `post`
    Post,
    /// `delete`
    Delete,
    /// `options`
    Options,
    /// `head`
    Head,
    /// `patch`
    Patch,
}

impl HttpMethod {
    /// All verbs, in the order Swagger lists them.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
    ];

    /// Lowercase verb, as used for Axios method names and path item keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
        }
    }

    /// Parse a path item key. Case-insensitive.
    pub fn parse(key: &str) -> Option<Self> {
        HttpMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(key))
    }

    /// Whether Axios takes the request body as a positional argument.
    pub fn has_body_argument(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    /// The operation declared for this verb on a path item.
    pub fn operation<'a>(&self, item: &'a PathItem) -> Option<&'a Operation> {
        match self {
            HttpMethod::Get => item.get.as_ref(),
            HttpMethod::Put => item.put.as_ref(),
            HttpMethod::Post => item.post.as_ref(),
            HttpMethod::Delete => item.delete.as_ref(),
            HttpMethod::Options => item.options.as_ref(),
            HttpMethod::Head => item.head.as_ref(),
            HttpMethod::Patch => item.patch.as_ref(),
        }
    }
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    /// Name as declared in the document (the query string or path key).
    pub name: String,
    /// Name used as the TypeScript argument.
    pub identifier: String,
    /// Argument type.
    pub ty: ResolvedType,
    /// Whether the argument is mandatory. Always true for path parameters.
    pub required: bool,
}

/// Documentation for one parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    /// Argument name the text belongs to.
    pub name: String,
    /// Text, already prepared for a block comment.
    pub text: String,
}

/// Everything needed to print one client method.
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    /// URL as declared in the document.
    pub url: String,
    /// URL with path variables removed.
    pub normalized_url: String,
    /// URL as a TypeScript expression: `'/pets'` or `` `/pets/${id}` ``.
    pub formatted_url: String,
    /// HTTP verb.
    pub method: HttpMethod,
    /// Path parameters in URL order.
    pub path_parameters: Vec<ParameterDescriptor>,
    /// Query parameters in declaration order.
    pub query_parameters: Vec<ParameterDescriptor>,
    /// Body parameters in declaration order.
    pub body_parameters: Vec<ParameterDescriptor>,
    /// Response type, `None` for `void`.
    pub return_type: Option<ResolvedType>,
    /// Method name.
    pub method_name: String,
    /// Operation summary, prepared for a block comment.
    pub summary: Option<String>,
    /// Parameter documentation.
    pub descriptions: Vec<Description>,
    /// Whether the method takes an access token for the `Authorization` header.
    pub requires_bearer_authorization: bool,
    /// Whether the body goes into the request config's `data` field.
    pub needs_data_obj: bool,
    /// Definitions referenced by parameter and response types.
    pub imports: BTreeSet<String>,
}

struct CollectedParameter {
    parameter: Parameter,
    from_reference: bool,
}

impl OperationDescriptor {
    /// Build the descriptor for `method` on `url`.
    pub fn new(
        url: &str,
        method: HttpMethod,
        operation: &Operation,
        path_item: &PathItem,
        document: &Document,
    ) -> Self {
        let resolver = TypeResolver::for_document(document);
        let variables = path_variables(url);
        let parameters = collect_parameters(
            url,
            method,
            &path_item.parameters,
            &operation.parameters,
            document,
        );

        let mut path_parameters = Vec::new();
        let mut query_parameters = Vec::new();
        let mut body_parameters = Vec::new();
        let mut documented = Vec::new();

        for CollectedParameter {
            parameter,
            from_reference,
        } in &parameters
        {
            let identifier = sanitize_ts_identifier(&parameter.name);
            match parameter.location {
                ParameterLocation::Path => path_parameters.push(ParameterDescriptor {
                    name: parameter.name.clone(),
                    identifier,
                    ty: simple_type(parameter.param_type.as_deref()),
                    required: true,
                }),
                ParameterLocation::Query => query_parameters.push(ParameterDescriptor {
                    name: parameter.name.clone(),
                    identifier,
                    ty: simple_type(parameter.param_type.as_deref()),
                    required: parameter.required,
                }),
                ParameterLocation::Body => {
                    let ty = match &parameter.schema {
                        Some(schema) => {
                            resolver.resolve(&SchemaNode::from_schema(schema), &parameter.name)
                        }
                        None => ResolvedType::empty_object(),
                    };
                    body_parameters.push(ParameterDescriptor {
                        name: parameter.name.clone(),
                        identifier,
                        ty,
                        required: parameter.required,
                    });
                }
                ParameterLocation::Header | ParameterLocation::FormData => {
                    debug!(
                        url,
                        method = method.as_str(),
                        parameter = %parameter.name,
                        location = ?parameter.location,
                        "Skipping parameter, only path, query and body parameters are generated."
                    );
                    continue;
                }
            }

            if !*from_reference && let Some(text) = &parameter.description {
                documented.push((
                    parameter.location,
                    parameter.name.clone(),
                    add_stars_to_newline(text),
                ));
            }
        }

        order_path_parameters(&mut path_parameters, &variables);

        let requires_bearer_authorization = requires_bearer_authorization(operation, document);
        reserve_identifiers(
            [&mut path_parameters, &mut query_parameters, &mut body_parameters],
            requires_bearer_authorization,
        );

        let descriptions = documented
            .into_iter()
            .filter_map(|(location, name, text)| {
                let group = match location {
                    ParameterLocation::Path => &path_parameters,
                    ParameterLocation::Query => &query_parameters,
                    _ => &body_parameters,
                };
                group.iter().find(|p| p.name == name).map(|p| Description {
                    name: p.identifier.clone(),
                    text,
                })
            })
            .collect();

        let method_name = method_name(operation, method, &variables);
        let return_type = return_type(url, method, operation, document, &resolver);

        let mut imports = BTreeSet::new();
        for parameter in &body_parameters {
            imports.extend(parameter.ty.imports.iter().cloned());
        }
        if let Some(return_type) = &return_type {
            imports.extend(return_type.imports.iter().cloned());
        }

        Self {
            url: url.to_string(),
            normalized_url: normalize_url(url),
            formatted_url: format_url(url, &path_parameters),
            method,
            path_parameters,
            query_parameters,
            body_parameters,
            return_type,
            method_name,
            summary: operation
                .summary
                .as_deref()
                .or(operation.description.as_deref())
                .map(add_stars_to_newline),
            descriptions,
            requires_bearer_authorization,
            needs_data_obj: !method.has_body_argument(),
            imports,
        }
    }
}

/// Names of `{variables}` in a URL, in order of appearance.
pub fn path_variables(url: &str) -> Vec<String> {
    let mut variables = Vec::new();
    let mut rest = url;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        let name = &after[..end];
        if !name.is_empty() && !variables.iter().any(|v| v == name) {
            variables.push(name.to_string());
        }
        rest = &after[end + 1..];
    }
    variables
}

/// The URL as a TypeScript expression.
///
/// Without variables it is a single-quoted string, otherwise a template
/// literal with each `{name}` replaced by `${identifier}`, where the
/// identifier is the one of the matching path parameter.
pub fn format_url(url: &str, path_parameters: &[ParameterDescriptor]) -> String {
    if !url.contains('{') {
        return format!("'{}'", url.replace('\\', "\\\\").replace('\'', "\\'"));
    }

    let mut formatted = String::from("`");
    let mut rest = url;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        formatted.push_str(&escape_template(&rest[..start]));
        formatted.push_str("${");
        let variable = &after[..end];
        match path_parameters.iter().find(|p| p.name == variable) {
            Some(parameter) => formatted.push_str(&parameter.identifier),
            None => formatted.push_str(&sanitize_ts_identifier(variable)),
        }
        formatted.push('}');
        rest = &after[end + 1..];
    }
    formatted.push_str(&escape_template(rest));
    formatted.push('`');
    formatted
}

fn escape_template(s: &str) -> String {
    s.replace('\\', "\\\\").replace('`', "\\`").replace("${", "\\${")
}

/// Map a non-body parameter type onto `string`, `boolean`, `number` or `{}`.
fn simple_type(param_type: Option<&str>) -> ResolvedType {
    match param_type.map(str::to_ascii_lowercase).as_deref() {
        Some("string") => ResolvedType::primitive(TsPrimitive::String),
        Some("boolean") => ResolvedType::primitive(TsPrimitive::Boolean),
        Some("number" | "integer") => ResolvedType::primitive(TsPrimitive::Number),
        _ => ResolvedType::empty_object(),
    }
}

/// Merge path item and operation parameters, dereferencing `$ref`s.
///
/// An operation parameter replaces a path item parameter with the same name
/// and location.
fn collect_parameters(
    url: &str,
    method: HttpMethod,
    shared: &[ParameterOrRef],
    own: &[ParameterOrRef],
    document: &Document,
) -> Vec<CollectedParameter> {
    let mut collected: Vec<CollectedParameter> = Vec::new();

    for entry in shared.iter().chain(own) {
        let resolved = match entry {
            ParameterOrRef::Inline(parameter) => Some(CollectedParameter {
                parameter: (**parameter).clone(),
                from_reference: false,
            }),
            ParameterOrRef::Ref { reference } => {
                dereference_parameter(reference, document).map(|parameter| CollectedParameter {
                    parameter,
                    from_reference: true,
                })
            }
        };

        let Some(resolved) = resolved else {
            warn!(
                url,
                method = method.as_str(),
                "Dropping parameter whose reference could not be resolved."
            );
            continue;
        };

        collected.retain(|existing| {
            existing.parameter.name != resolved.parameter.name
                || existing.parameter.location != resolved.parameter.location
        });
        collected.push(resolved);
    }

    collected
}

/// Follow a `$ref` chain to a parameter object.
fn dereference_parameter(reference: &str, document: &Document) -> Option<Parameter> {
    let mut seen = HashSet::new();
    let mut current = reference.to_string();

    loop {
        if !seen.insert(current.clone()) {
            warn!(reference, "Cyclic parameter reference.");
            return None;
        }
        if !current.starts_with("#/parameters/") && !current.starts_with("#/definitions/") {
            warn!(
                reference = %current,
                "Unsupported parameter reference, expected \"#/parameters/\" or \"#/definitions/\"."
            );
            return None;
        }
        let Some(value) = document.lookup_ref(&current) else {
            warn!(reference = %current, "Parameter reference points to nothing.");
            return None;
        };
        if let Some(next) = value.get("$ref").and_then(Value::as_str) {
            current = next.to_string();
            continue;
        }
        return match serde_json::from_value::<Parameter>(value.clone()) {
            Ok(parameter) => Some(parameter),
            Err(err) => {
                warn!(reference = %current, error = %err, "Referenced object is not a parameter.");
                None
            }
        };
    }
}

/// Locals the resource template declares in every method body.
const TEMPLATE_LOCALS: [&str; 3] = ["config", "resource", "response"];

/// Rename arguments that clash with a template local or an earlier argument.
///
/// A clashing identifier gets `_` prefixes until it is free, so a `config`
/// query parameter becomes `_config`. `accessToken` is only taken when the
/// method adds it.
fn reserve_identifiers(groups: [&mut Vec<ParameterDescriptor>; 3], access_token: bool) {
    let mut taken: HashSet<String> = TEMPLATE_LOCALS.iter().map(ToString::to_string).collect();
    if access_token {
        taken.insert("accessToken".to_string());
    }

    for parameter in groups.into_iter().flatten() {
        let mut identifier = parameter.identifier.clone();
        while taken.contains(&identifier) {
            identifier.insert(0, '_');
        }
        if identifier != parameter.identifier {
            debug!(
                parameter = %parameter.name,
                identifier = %identifier,
                "Renamed argument that clashes with another name in the method."
            );
            parameter.identifier.clone_from(&identifier);
        }
        taken.insert(identifier);
    }
}

/// Sort declared path parameters by URL position and add the missing ones.
///
/// A `{variable}` without a declared parameter becomes an `any` argument.
/// Declared path parameters that do not occur in the URL are kept at the end.
fn order_path_parameters(parameters: &mut Vec<ParameterDescriptor>, variables: &[String]) {
    let mut declared = std::mem::take(parameters);

    for variable in variables {
        match declared.iter().position(|p| &p.name == variable) {
            Some(index) => parameters.push(declared.remove(index)),
            None => parameters.push(ParameterDescriptor {
                name: variable.clone(),
                identifier: sanitize_ts_identifier(variable),
                ty: ResolvedType::primitive(TsPrimitive::Any),
                required: true,
            }),
        }
    }

    parameters.extend(declared);
}

fn method_name(operation: &Operation, method: HttpMethod, variables: &[String]) -> String {
    if let Some(operation_id) = operation.operation_id.as_deref().filter(|id| !id.is_empty()) {
        if needs_bracket_notation(operation_id) {
            let sanitized = sanitize_ts_identifier(operation_id);
            debug!(operation_id, method_name = %sanitized, "Sanitized operationId.");
            return sanitized;
        }
        return operation_id.to_string();
    }

    match variables.first() {
        None => format!("{}All", method.as_str()),
        Some(variable) => {
            let words: Vec<&str> = variable.split(['-', '.', ' ']).collect();
            let suffix: String = pascal_case(&words)
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        c
                    } else {
                        '_'
                    }
                })
                .collect();
            format!("{}By{suffix}", method.as_str())
        }
    }
}

/// Look up a response, following `#/responses/` references.
fn dereference_response<'a>(
    response: &'a ResponseOrRef,
    document: &'a Document,
) -> Option<&'a Response> {
    let mut seen = HashSet::new();
    let mut current = response;

    loop {
        match current {
            ResponseOrRef::Inline(response) => return Some(response),
            ResponseOrRef::Ref { reference } => {
                if !seen.insert(reference.as_str()) {
                    warn!(reference = %reference, "Cyclic response reference.");
                    return None;
                }
                let Some(next) = reference
                    .strip_prefix("#/responses/")
                    .and_then(|name| document.spec().responses.get(name))
                else {
                    warn!(reference = %reference, "Response reference could not be resolved.");
                    return None;
                };
                current = next;
            }
        }
    }
}

/// Type of the `200` and `201` responses, unioned when both declare one.
fn return_type(
    url: &str,
    method: HttpMethod,
    operation: &Operation,
    document: &Document,
    resolver: &TypeResolver<'_>,
) -> Option<ResolvedType> {
    let mut types = Vec::new();

    for code in ["200", "201"] {
        let schema = operation
            .responses
            .get(code)
            .and_then(|response| dereference_response(response, document))
            .and_then(|response| response.schema.as_ref());
        if let Some(schema) = schema {
            let context = format!("{} {url} {code}", method.as_str().to_ascii_uppercase());
            types.push(resolver.resolve(&SchemaNode::from_schema(schema), &context));
        }
    }

    if types.is_empty() {
        let other_success = operation.responses.iter().find(|(code, response)| {
            code.starts_with('2')
                && dereference_response(response, document).is_some_and(|r| r.schema.is_some())
        });
        if let Some((code, _)) = other_success {
            warn!(
                url,
                method = method.as_str(),
                code = %code,
                "Only 200 and 201 responses are typed, returning void."
            );
        }
    }

    ResolvedType::union(types)
}

/// Whether any applicable security requirement asks for a bearer token.
///
/// Matches a scheme named `Bearer` (any case) and `apiKey` schemes sent in
/// the `Authorization` header.
fn requires_bearer_authorization(operation: &Operation, document: &Document) -> bool {
    let spec = document.spec();
    operation
        .effective_security(spec)
        .iter()
        .flat_map(|requirement| requirement.keys())
        .any(|scheme_name| {
            scheme_name.eq_ignore_ascii_case("bearer")
                || spec
                    .security_definitions
                    .get(scheme_name)
                    .is_some_and(|scheme| {
                        scheme.scheme_type.eq_ignore_ascii_case("apiKey")
                            && scheme
                                .location
                                .as_deref()
                                .is_some_and(|l| l.eq_ignore_ascii_case("header"))
                            && scheme
                                .name
                                .as_deref()
                                .is_some_and(|n| n.eq_ignore_ascii_case("authorization"))
                    })
        })
}

impl OperationDescriptor {
    /// Return type expression, `void` when there is none.
    pub fn return_expression(&self) -> String {
        match &self.return_type {
            Some(return_type) => return_type.expression(),
            None => TsPrimitive::Void.emit(),
        }
    }
}
