//! Grouping operations into resource units (one service class each).
//!
//! A collection URL (`/things`) and its item URL (`/things/{id}`) normalize
//! to the same directory and service name and therefore end up in the same
//! class.

use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use super::definition_import_path;
use super::naming::{generate_resource_name, normalize_url};
use super::operation::{HttpMethod, OperationDescriptor};
use crate::swagger::Document;

/// Top-level output directory for service classes.
pub const REST_DIR: &str = "rest";

/// One generated service class.
#[derive(Debug, Clone)]
pub struct ResourceUnit {
    /// Output directory relative to the output root (`rest/api/v1`).
    pub directory: String,
    /// Class name (`ExchangeService`).
    pub name: String,
    /// Operations in first-seen order.
    pub operations: Vec<OperationDescriptor>,
    /// Definitions referenced by any operation.
    pub imports: BTreeSet<String>,
    method_names: HashMap<String, usize>,
}

impl ResourceUnit {
    fn new(directory: String, name: String) -> Self {
        Self {
            directory,
            name,
            operations: Vec::new(),
            imports: BTreeSet::new(),
            method_names: HashMap::new(),
        }
    }

    /// Grouping key, `directory/name`.
    pub fn key(&self) -> String {
        format!("{}/{}", self.directory, self.name)
    }

    /// Output file relative to the output root.
    pub fn file_path(&self) -> String {
        format!("{}.ts", self.key())
    }

    /// Module specifier for a definition, relative to this unit's file.
    pub fn import_path(&self, definition: &str) -> String {
        definition_import_path(&self.directory, definition)
    }

    fn push(&mut self, mut operation: OperationDescriptor) {
        let seen = self
            .method_names
            .entry(operation.method_name.clone())
            .or_insert(0);
        *seen += 1;
        if *seen > 1 {
            let mut suffix = *seen;
            let mut renamed = format!("{}{suffix}", operation.method_name);
            while self.method_names.contains_key(&renamed) {
                suffix += 1;
                renamed = format!("{}{suffix}", operation.method_name);
            }
            warn!(
                service = %self.name,
                method_name = %operation.method_name,
                renamed = %renamed,
                url = %operation.url,
                "Duplicate method name in service, renaming."
            );
            self.method_names.insert(renamed.clone(), 1);
            operation.method_name = renamed;
        }

        self.imports.extend(operation.imports.iter().cloned());
        self.operations.push(operation);
    }
}

/// Group every operation of the document into resource units.
///
/// Units come out in the order their first URL appears in `paths`.
pub fn export_services(document: &Document) -> Vec<ResourceUnit> {
    let mut units: IndexMap<String, ResourceUnit> = IndexMap::new();

    for (url, item) in &document.spec().paths {
        let normalized = normalize_url(url);
        let parent = normalized
            .rfind('/')
            .map_or("", |index| &normalized[..index]);
        let directory = format!("{REST_DIR}{parent}");
        let name = generate_resource_name(&normalized);

        let unit = units
            .entry(format!("{directory}/{name}"))
            .or_insert_with(|| ResourceUnit::new(directory, name));

        for method in declared_methods(document, url) {
            if let Some(operation) = method.operation(item) {
                unit.push(OperationDescriptor::new(url, method, operation, item, document));
            }
        }
    }

    debug!(services = units.len(), "Grouped operations into services.");
    units.into_values().collect()
}

/// Verbs declared on a path item, in declaration order.
fn declared_methods(document: &Document, url: &str) -> Vec<HttpMethod> {
    document
        .raw()
        .get("paths")
        .and_then(|paths| paths.get(url))
        .and_then(Value::as_object)
        .map(|item| item.keys().filter_map(|key| HttpMethod::parse(key)).collect())
        .unwrap_or_else(|| HttpMethod::ALL.to_vec())
}
