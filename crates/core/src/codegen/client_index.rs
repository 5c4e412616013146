//! Client index: the aggregate `APIClient` and the `index.ts` files.
//!
//! Built after every service and definition file has been written, from
//! the tree of generated files. Services are exposed as nested namespaces
//! mirroring the output directories:
//!
//! ```text
//! rest/api/v1/ExchangeService.ts  ->  client.rest.api.v1.exchangeService
//! ```
//!
//! Two services with the same class name in different directories would
//! clash in the client's import list. The first one seen keeps its name;
//! later ones are imported under an alias with a numeric suffix.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::INTERFACES_DIR;
use super::naming::{camelize, quote_if_needed};
use crate::error::{GenerateError, Result};

/// File name of the aggregate client, without extension.
pub const API_CLIENT_NAME: &str = "APIClient";

const INDEX_NAME: &str = "index";

/// Hands out unique class names for one generation run.
///
/// `register` returns `None` when the name is still free and an alternative
/// (`Name1`, `Name2`, ...) when it is taken.
#[derive(Debug, Default)]
pub struct NameRegistry {
    taken: HashSet<String>,
}

impl NameRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name`, or the first free numbered alternative.
    pub fn register(&mut self, name: &str) -> Option<String> {
        if self.taken.insert(name.to_string()) {
            return None;
        }
        let mut index = 1usize;
        loop {
            let candidate = format!("{name}{index}");
            if self.taken.insert(candidate.clone()) {
                return Some(candidate);
            }
            index += 1;
        }
    }
}

/// A generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// File name without extension, which is also the class name.
    pub name: String,
    /// Alias when `name` is already taken by another file.
    pub alternative_name: Option<String>,
    /// Path relative to the output root, without extension.
    pub full_path: String,
}

impl FileEntry {
    /// Name the class is imported as.
    pub fn import_name(&self) -> &str {
        self.alternative_name.as_deref().unwrap_or(&self.name)
    }
}

/// A directory of generated files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirEntry {
    /// Directory name, empty for the output root.
    pub name: String,
    /// Path relative to the output root, empty for the output root.
    pub path: String,
    /// Files by name, sorted.
    pub files: BTreeMap<String, FileEntry>,
    /// Sub-directories by name, sorted.
    pub directories: BTreeMap<String, DirEntry>,
}

impl DirEntry {
    /// Index the `.ts` files below `root`.
    ///
    /// `index.ts` files and the aggregate client are skipped.
    pub fn scan(root: &Path, registry: &mut NameRegistry) -> Result<Self> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|err| {
                let path = err.path().unwrap_or(root).to_path_buf();
                GenerateError::io(path, err.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let relative: Vec<_> = relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy().into_owned())
                .collect();
            paths.push(relative.join("/"));
        }

        debug!(root = %root.display(), files = paths.len(), "Scanned output directory.");
        Ok(Self::from_paths(paths, registry))
    }

    /// Index an in-memory list of `/`-separated paths relative to the root.
    pub fn from_paths<I, S>(paths: I, registry: &mut NameRegistry) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root = DirEntry::default();

        for path in paths {
            let path = path.as_ref();
            let Some(stem) = path.strip_suffix(".ts") else {
                continue;
            };
            let mut segments: Vec<&str> = stem.split('/').filter(|s| !s.is_empty()).collect();
            let Some(name) = segments.pop() else {
                continue;
            };
            if name == INDEX_NAME || (segments.is_empty() && name == API_CLIENT_NAME) {
                continue;
            }

            let mut dir = &mut root;
            for segment in &segments {
                let child_path = join(&dir.path, segment);
                dir = dir
                    .directories
                    .entry((*segment).to_string())
                    .or_insert_with(|| DirEntry {
                        name: (*segment).to_string(),
                        path: child_path,
                        ..DirEntry::default()
                    });
            }

            dir.files.insert(
                name.to_string(),
                FileEntry {
                    name: name.to_string(),
                    alternative_name: None,
                    full_path: join(&dir.path, name),
                },
            );
        }

        root.register_names(registry, true);
        root
    }

    /// Files first, then sub-directories, both in name order. Definitions
    /// are not part of the client and keep their names.
    fn register_names(&mut self, registry: &mut NameRegistry, is_root: bool) {
        for file in self.files.values_mut() {
            file.alternative_name = registry.register(&file.name);
        }
        for (name, directory) in &mut self.directories {
            if is_root && name == INTERFACES_DIR {
                continue;
            }
            directory.register_names(registry, false);
        }
    }
}

fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}/{child}")
    }
}

/// A node of the client's namespace tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiNode {
    /// A service instance.
    Service {
        /// Class name as imported.
        class_name: String,
    },
    /// A nested namespace.
    Namespace(IndexMap<String, ApiNode>),
}

impl ApiNode {
    /// TypeScript expression for this node.
    ///
    /// `indent` is the column of the line the expression starts on; nested
    /// lines are indented two spaces further.
    pub fn to_typescript(&self, indent: usize) -> String {
        match self {
            ApiNode::Service { class_name } => format!("new {class_name}(this.httpClient)"),
            ApiNode::Namespace(children) => {
                let pad = " ".repeat(indent + 2);
                let mut out = String::from("{\n");
                for (key, child) in children {
                    out.push_str(&pad);
                    out.push_str(&quote_if_needed(key));
                    out.push_str(": ");
                    out.push_str(&child.to_typescript(indent + 2));
                    out.push_str(",\n");
                }
                out.push_str(&" ".repeat(indent));
                out.push('}');
                out
            }
        }
    }
}

/// One `import {A, B as B1} from './dir';` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportGroup {
    /// Module specifier, relative to the output root.
    pub path: String,
    /// Imported names, `Name` or `Name as Alias`.
    pub names: Vec<String>,
}

impl ImportGroup {
    /// The import statement.
    pub fn to_typescript(&self) -> String {
        format!("import {{{}}} from '{}';", self.names.join(", "), self.path)
    }
}

/// Namespace tree and imports of the aggregate client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIndex {
    /// Top-level namespaces and services.
    pub api: IndexMap<String, ApiNode>,
    /// Imports, one per directory that contains services.
    pub imports: Vec<ImportGroup>,
}

impl ClientIndex {
    /// Build the client from a file tree.
    pub fn build(root: &DirEntry) -> Self {
        let mut imports = Vec::new();
        let api = namespace(root, true, &mut imports);
        Self { api, imports }
    }
}

fn namespace(
    dir: &DirEntry,
    is_root: bool,
    imports: &mut Vec<ImportGroup>,
) -> IndexMap<String, ApiNode> {
    let mut nodes = IndexMap::new();

    if !dir.files.is_empty() {
        imports.push(ImportGroup {
            path: format!("./{}", dir.path),
            names: dir
                .files
                .values()
                .map(|file| match &file.alternative_name {
                    Some(alias) => format!("{} as {alias}", file.name),
                    None => file.name.clone(),
                })
                .collect(),
        });
    }

    for file in dir.files.values() {
        insert_unique(
            &mut nodes,
            camelize(&file.name),
            ApiNode::Service {
                class_name: file.import_name().to_string(),
            },
        );
    }

    for (name, child) in &dir.directories {
        if is_root && name == INTERFACES_DIR {
            continue;
        }
        let children = namespace(child, false, imports);
        if children.is_empty() {
            continue;
        }
        insert_unique(&mut nodes, camelize(name), ApiNode::Namespace(children));
    }

    nodes
}

fn insert_unique(nodes: &mut IndexMap<String, ApiNode>, key: String, node: ApiNode) {
    if !nodes.contains_key(&key) {
        nodes.insert(key, node);
        return;
    }
    let mut index = 1usize;
    let unique = loop {
        let candidate = format!("{key}{index}");
        if !nodes.contains_key(&candidate) {
            break candidate;
        }
        index += 1;
    };
    warn!(key = %key, renamed = %unique, "Client namespace key collision, renaming.");
    nodes.insert(unique, node);
}

/// One `index.ts` re-export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexFile {
    /// Directory relative to the output root, empty for the root.
    pub directory: String,
    /// Module specifiers to re-export: `./File` and `./dir/`.
    pub exports: Vec<String>,
}

impl IndexFile {
    /// Index files for every directory of the tree, root first.
    ///
    /// The root index also re-exports the aggregate client.
    pub fn collect(root: &DirEntry) -> Vec<Self> {
        let mut files = Vec::new();
        collect_index_files(root, true, &mut files);
        files
    }

    /// Output file relative to the output root.
    pub fn file_path(&self) -> String {
        join(&self.directory, &format!("{INDEX_NAME}.ts"))
    }
}

fn collect_index_files(dir: &DirEntry, is_root: bool, out: &mut Vec<IndexFile>) {
    let mut exports: Vec<String> = dir.files.keys().map(|name| format!("./{name}")).collect();
    if is_root {
        exports.push(format!("./{API_CLIENT_NAME}"));
    }
    exports.extend(dir.directories.keys().map(|name| format!("./{name}/")));

    out.push(IndexFile {
        directory: dir.path.clone(),
        exports,
    });

    for child in dir.directories.values() {
        collect_index_files(child, false, out);
    }
}
