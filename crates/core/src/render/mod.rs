//! Rendering the generated files.
//!
//! Templates are embedded into the binary and rendered one-off with tera.
//! Everything a template prints is prepared here as plain strings so the
//! templates themselves stay free of TypeScript logic.

use rust_embed::RustEmbed;
use serde::Serialize;
use tera::{Context, Tera};

use crate::codegen::naming::quote_if_needed;
use crate::codegen::{
    ClientIndex, Declaration, INTERFACES_DIR, IndexFile, InterfaceUnit, OperationDescriptor,
    ParameterDescriptor, ResourceUnit, definition_import_path,
};
use crate::error::{GenerateError, Result};

#[derive(RustEmbed)]
#[folder = "templates/"]
struct Templates;

const RESOURCE_TEMPLATE: &str = "resource.ts.tera";
const INTERFACE_TEMPLATE: &str = "interface.ts.tera";
const API_CLIENT_TEMPLATE: &str = "api_client.ts.tera";
const INDEX_TEMPLATE: &str = "index.ts.tera";

fn render(template: &str, context: &impl Serialize) -> Result<String> {
    let file =
        Templates::get(template).ok_or_else(|| GenerateError::MissingTemplate(template.into()))?;
    let content = String::from_utf8_lossy(&file.data);

    let render_error = |source| GenerateError::Render {
        template: template.to_string(),
        source,
    };
    let context = Context::from_serialize(context).map_err(render_error)?;
    Tera::one_off(&content, &context, false).map_err(render_error)
}

#[derive(Serialize)]
struct ResourceContext {
    name: String,
    imports: String,
    methods: Vec<MethodContext>,
}

#[derive(Serialize)]
struct MethodContext {
    name: String,
    doc: String,
    signature: String,
    return_type: String,
    resource: String,
    has_config: bool,
    config_lines: Vec<String>,
    call: String,
    returns_void: bool,
}

/// Render a service class.
pub fn render_resource(unit: &ResourceUnit) -> Result<String> {
    let methods: Vec<MethodContext> = unit.operations.iter().map(method_context).collect();

    let mut axios = vec!["AxiosInstance"];
    if methods.iter().any(|method| method.has_config) {
        axios.push("AxiosRequestConfig");
    }
    let mut lines = vec![format!("import {{{}}} from 'axios';", axios.join(", "))];
    lines.extend(
        unit.imports
            .iter()
            .map(|definition| import_line(definition, &unit.import_path(definition))),
    );

    render(
        RESOURCE_TEMPLATE,
        &ResourceContext {
            name: unit.name.clone(),
            imports: import_block(&lines),
            methods,
        },
    )
}

fn import_line(name: &str, path: &str) -> String {
    format!("import {{{name}}} from '{path}';")
}

/// Import statements followed by a blank line, or nothing.
fn import_block(lines: &[String]) -> String {
    if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n\n", lines.join("\n"))
    }
}

fn method_context(operation: &OperationDescriptor) -> MethodContext {
    let return_type = operation.return_expression();
    let returns_void = operation.return_type.is_none();

    let mut config_lines = Vec::new();
    if operation.requires_bearer_authorization {
        config_lines.push("headers: {Authorization: `Bearer ${accessToken}`},".to_string());
    }
    if !operation.query_parameters.is_empty() {
        let params: Vec<String> = operation
            .query_parameters
            .iter()
            .map(|parameter| {
                let key = quote_if_needed(&parameter.name);
                if key == parameter.identifier {
                    key
                } else {
                    format!("{key}: {}", parameter.identifier)
                }
            })
            .collect();
        config_lines.push(format!("params: {{{}}},", params.join(", ")));
    }
    let body = operation.body_parameters.first();
    if operation.needs_data_obj
        && let Some(body) = body
    {
        config_lines.push(format!("data: {},", body.identifier));
    }
    let has_config = !config_lines.is_empty();

    let mut arguments = vec!["resource".to_string()];
    if operation.method.has_body_argument() {
        match body {
            Some(body) => arguments.push(body.identifier.clone()),
            None if has_config => arguments.push("undefined".to_string()),
            None => {}
        }
    }
    if has_config {
        arguments.push("config".to_string());
    }
    let generic = if returns_void {
        String::new()
    } else {
        format!("<{return_type}>")
    };
    let call = format!(
        "this.apiClient.{}{generic}({})",
        operation.method.as_str(),
        arguments.join(", ")
    );

    MethodContext {
        name: operation.method_name.clone(),
        doc: doc_comment(operation),
        signature: signature(operation),
        return_type,
        resource: operation.formatted_url.clone(),
        has_config,
        config_lines,
        call,
        returns_void,
    }
}

fn doc_comment(operation: &OperationDescriptor) -> String {
    if operation.summary.is_none() && operation.descriptions.is_empty() {
        return String::new();
    }
    let mut doc = String::from("  /**\n");
    if let Some(summary) = &operation.summary {
        doc.push_str(&format!("   * {summary}\n"));
    }
    for description in &operation.descriptions {
        doc.push_str(&format!(
            "   * @param {} {}\n",
            description.name, description.text
        ));
    }
    doc.push_str("   */\n");
    doc
}

/// Path parameters, then required body and query parameters, then the
/// access token, then optional body and query parameters.
fn signature(operation: &OperationDescriptor) -> String {
    let argument = |parameter: &ParameterDescriptor, optional: bool| {
        format!(
            "{}{}: {}",
            parameter.identifier,
            if optional { "?" } else { "" },
            parameter.ty.expression()
        )
    };

    let mut arguments: Vec<String> = operation
        .path_parameters
        .iter()
        .map(|parameter| argument(parameter, false))
        .collect();

    let others = || {
        operation
            .body_parameters
            .iter()
            .chain(&operation.query_parameters)
    };
    arguments.extend(
        others()
            .filter(|parameter| parameter.required)
            .map(|parameter| argument(parameter, false)),
    );
    if operation.requires_bearer_authorization {
        arguments.push("accessToken: string".to_string());
    }
    arguments.extend(
        others()
            .filter(|parameter| !parameter.required)
            .map(|parameter| argument(parameter, true)),
    );

    arguments.join(", ")
}

#[derive(Serialize)]
struct InterfaceContext {
    name: String,
    imports: String,
    is_interface: bool,
    members: Vec<String>,
    expression: String,
}

/// Render a definition file.
pub fn render_interface(unit: &InterfaceUnit) -> Result<String> {
    let lines: Vec<String> = unit
        .imports
        .iter()
        .map(|definition| {
            import_line(
                definition,
                &definition_import_path(INTERFACES_DIR, definition),
            )
        })
        .collect();

    render(
        INTERFACE_TEMPLATE,
        &InterfaceContext {
            name: unit.name.clone(),
            imports: import_block(&lines),
            is_interface: unit.declaration == Declaration::Interface,
            members: unit.members(),
            expression: unit.ty.expression(),
        },
    )
}

#[derive(Serialize)]
struct ApiClientContext {
    imports: Vec<String>,
    getters: Vec<Getter>,
}

#[derive(Serialize)]
struct Getter {
    name: String,
    value: String,
}

/// Render the aggregate client.
pub fn render_api_client(index: &ClientIndex) -> Result<String> {
    render(
        API_CLIENT_TEMPLATE,
        &ApiClientContext {
            imports: index.imports.iter().map(|group| group.to_typescript()).collect(),
            getters: index
                .api
                .iter()
                .map(|(name, node)| Getter {
                    name: quote_if_needed(name),
                    value: node.to_typescript(4),
                })
                .collect(),
        },
    )
}

#[derive(Serialize)]
struct IndexContext<'a> {
    exports: &'a [String],
}

/// Render a re-export file.
pub fn render_index(index: &IndexFile) -> Result<String> {
    render(
        INDEX_TEMPLATE,
        &IndexContext {
            exports: &index.exports,
        },
    )
}
