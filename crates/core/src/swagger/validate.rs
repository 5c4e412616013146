//! Structural validation of a Swagger 2.0 document.
//!
//! Runs on the raw `serde_json::Value` before it is mapped onto the typed
//! model, so that problems are reported by JSON path instead of as a serde
//! error about the first field that failed. Findings are collected, not
//! short-circuited; any finding aborts the run.

use serde_json::Value;

const HTTP_VERBS: [&str; 7] = ["get", "put", "post", "delete", "options", "head", "patch"];
const PARAMETER_LOCATIONS: [&str; 5] = ["query", "header", "path", "formData", "body"];

/// Validate a document, returning every problem found.
pub fn validate_document(document: &Value) -> Vec<String> {
    let mut findings = Vec::new();

    validate_info(document.get("info"), &mut findings);

    match document.get("paths") {
        Some(Value::Object(paths)) => {
            for (url, item) in paths.iter().filter(|(key, _)| !is_extension(key)) {
                validate_path_item(url, item, &mut findings);
            }
        }
        Some(_) => findings.push("paths must be an object".to_string()),
        None => findings.push("paths is required".to_string()),
    }

    if let Some(definitions) = document.get("definitions")
        && !definitions.is_object()
    {
        findings.push("definitions must be an object".to_string());
    }

    findings
}

/// Vendor extension keys (`x-...`), allowed next to paths and fields.
pub fn is_extension(key: &str) -> bool {
    key.starts_with("x-")
}

fn validate_info(info: Option<&Value>, findings: &mut Vec<String>) {
    let Some(info) = info else {
        findings.push("info is required".to_string());
        return;
    };
    for field in ["title", "version"] {
        if !info.get(field).is_some_and(Value::is_string) {
            findings.push(format!("info.{field} is required and must be a string"));
        }
    }
}

fn validate_path_item(url: &str, item: &Value, findings: &mut Vec<String>) {
    if !url.starts_with('/') {
        findings.push(format!("paths.{url} must start with \"/\""));
    }

    let Some(item) = item.as_object() else {
        findings.push(format!("paths.{url} must be an object"));
        return;
    };

    if let Some(parameters) = item.get("parameters") {
        validate_parameters(&format!("paths.{url}.parameters"), parameters, findings);
    }

    for verb in HTTP_VERBS {
        let Some(operation) = item.get(verb) else {
            continue;
        };
        let location = format!("paths.{url}.{verb}");
        let Some(operation) = operation.as_object() else {
            findings.push(format!("{location} must be an object"));
            continue;
        };
        match operation.get("responses") {
            Some(Value::Object(_)) => {}
            Some(_) => findings.push(format!("{location}.responses must be an object")),
            None => findings.push(format!("{location}.responses is required")),
        }
        if let Some(parameters) = operation.get("parameters") {
            validate_parameters(&format!("{location}.parameters"), parameters, findings);
        }
    }
}

fn validate_parameters(location: &str, parameters: &Value, findings: &mut Vec<String>) {
    let Some(parameters) = parameters.as_array() else {
        findings.push(format!("{location} must be an array"));
        return;
    };

    for (index, parameter) in parameters.iter().enumerate() {
        let location = format!("{location}[{index}]");
        if parameter.get("$ref").is_some() {
            continue;
        }
        if !parameter.get("name").is_some_and(Value::is_string) {
            findings.push(format!("{location}.name is required"));
        }
        match parameter.get("in").and_then(Value::as_str) {
            Some("body") => {
                if parameter.get("schema").is_none() {
                    findings.push(format!("{location}.schema is required for body parameters"));
                }
            }
            Some("path") => {
                if parameter.get("required").and_then(Value::as_bool) != Some(true) {
                    findings.push(format!("{location}.required must be true for path parameters"));
                }
            }
            Some(other) if !PARAMETER_LOCATIONS.contains(&other) => {
                findings.push(format!(
                    "{location}.in must be one of {}, found \"{other}\"",
                    PARAMETER_LOCATIONS.join(", ")
                ));
            }
            Some(_) => {}
            None => findings.push(format!("{location}.in is required")),
        }
    }
}
