//! A generation run: load, validate, render and write.
//!
//! Nothing touches the output directory before the document has been
//! loaded and validated, so a broken input leaves an existing output tree
//! alone. Service and definition files are written concurrently; the
//! aggregate client and the `index.ts` files are built from the resulting
//! tree once every one of those writes has finished.

use std::path::{Path, PathBuf};

use futures_util::future::try_join_all;
use tracing::{debug, info};

use crate::codegen::{
    API_CLIENT_NAME, ClientIndex, DirEntry, INTERFACES_DIR, IndexFile, NameRegistry,
    export_interfaces, export_services,
};
use crate::error::{GenerateError, Result};
use crate::input::InputSource;
use crate::render::{render_api_client, render_index, render_interface, render_resource};
use crate::swagger::Document;

/// Output settings for one run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Directory the client is written to.
    pub output_dir: PathBuf,
    /// Replace an existing output directory.
    pub overwrite: bool,
}

/// A rendered file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// `/`-separated path relative to the output directory.
    pub path: String,
    /// File contents.
    pub contents: String,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateSummary {
    /// Service classes written.
    pub services: usize,
    /// Definition files written.
    pub interfaces: usize,
    /// `index.ts` files written.
    pub index_files: usize,
}

/// Read, parse and validate a document from a path or URL.
pub async fn load_document(input: &str) -> Result<Document> {
    let source = InputSource::parse(input);
    let text = source.read().await?;
    let document = Document::from_text(&text, &source.to_string())?;
    debug!(input = %source, paths = document.spec().paths.len(), "Loaded specification.");
    Ok(document)
}

/// Render every service class and definition file of a document.
pub fn generate_files(document: &Document) -> Result<Vec<GeneratedFile>> {
    let mut files = Vec::new();

    for unit in export_services(document) {
        files.push(GeneratedFile {
            path: unit.file_path(),
            contents: render_resource(&unit)?,
        });
    }
    for unit in export_interfaces(document) {
        files.push(GeneratedFile {
            path: unit.file_path(),
            contents: render_interface(&unit)?,
        });
    }

    Ok(files)
}

/// Render the aggregate client and the index files for a file tree.
pub fn generate_index_files(root: &DirEntry) -> Result<Vec<GeneratedFile>> {
    let mut files = vec![GeneratedFile {
        path: format!("{API_CLIENT_NAME}.ts"),
        contents: render_api_client(&ClientIndex::build(root))?,
    }];
    for index in IndexFile::collect(root) {
        files.push(GeneratedFile {
            path: index.file_path(),
            contents: render_index(&index)?,
        });
    }
    Ok(files)
}

/// Make sure `dir` can be written to, clearing it when `overwrite` is set.
pub async fn prepare_output_dir(dir: &Path, overwrite: bool) -> Result<()> {
    if tokio::fs::try_exists(dir)
        .await
        .map_err(|source| GenerateError::io(dir, source))?
    {
        if !overwrite {
            return Err(GenerateError::OutputExists(dir.to_path_buf()));
        }
        debug!(dir = %dir.display(), "Removing existing output directory.");
        tokio::fs::remove_dir_all(dir)
            .await
            .map_err(|source| GenerateError::io(dir, source))?;
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| GenerateError::io(dir, source))
}

async fn write_file(root: &Path, file: &GeneratedFile) -> Result<()> {
    let path = file
        .path
        .split('/')
        .fold(root.to_path_buf(), |path, segment| path.join(segment));
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| GenerateError::io(parent, source))?;
    }
    tokio::fs::write(&path, &file.contents)
        .await
        .map_err(|source| GenerateError::io(&path, source))
}

async fn write_all(root: &Path, files: &[GeneratedFile]) -> Result<()> {
    try_join_all(files.iter().map(|file| write_file(root, file))).await?;
    Ok(())
}

/// Write the client for an already loaded document.
pub async fn write_client(document: &Document, options: &GenerateOptions) -> Result<GenerateSummary> {
    let files = generate_files(document)?;
    let interface_prefix = format!("{INTERFACES_DIR}/");
    let interfaces = files
        .iter()
        .filter(|file| file.path.starts_with(&interface_prefix))
        .count();
    let services = files.len() - interfaces;

    prepare_output_dir(&options.output_dir, options.overwrite).await?;
    write_all(&options.output_dir, &files).await?;

    let output_dir = options.output_dir.clone();
    let root = tokio::task::spawn_blocking(move || {
        DirEntry::scan(&output_dir, &mut NameRegistry::new())
    })
    .await??;

    let index_files = generate_index_files(&root)?;
    write_all(&options.output_dir, &index_files).await?;

    let summary = GenerateSummary {
        services,
        interfaces,
        index_files: index_files.len() - 1,
    };
    info!(
        output = %options.output_dir.display(),
        services = summary.services,
        interfaces = summary.interfaces,
        "Generated API client."
    );
    Ok(summary)
}

/// Load `input` and write its client.
pub async fn run(input: &str, options: &GenerateOptions) -> Result<GenerateSummary> {
    let document = load_document(input).await?;
    write_client(&document, options).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const PETS: &str = r##"{
  "swagger": "2.0",
  "info": { "title": "Pets", "version": "1.0" },
  "paths": {
    "/pets": { "get": { "responses": { "200": { "description": "OK", "schema": { "type": "array", "items": { "$ref": "#/definitions/Pet" } } } } } },
    "/pets/{id}": { "delete": { "parameters": [{ "name": "id", "in": "path", "type": "integer", "required": true }], "responses": {} } }
  },
  "definitions": {
    "Pet": { "type": "object", "properties": { "name": { "type": "string" } } }
  }
}"##;

    #[test]
    fn test_generate_files_paths() {
        let document = Document::from_text(PETS, "pets.json").unwrap();
        let files = generate_files(&document).unwrap();
        let paths: Vec<_> = files.iter().map(|file| file.path.as_str()).collect();
        assert_eq!(paths, ["rest/PetsService.ts", "interfaces/Pet.ts"]);
    }

    #[test]
    fn test_generate_files_is_deterministic() {
        let document = Document::from_text(PETS, "pets.json").unwrap();
        assert_eq!(
            generate_files(&document).unwrap(),
            generate_files(&document).unwrap()
        );
    }

    #[tokio::test]
    async fn test_prepare_output_dir_refuses_existing() {
        let dir = tempfile::tempdir().unwrap();
        let err = prepare_output_dir(dir.path(), false).await.unwrap_err();
        assert!(matches!(err, GenerateError::OutputExists(_)));
    }

    #[tokio::test]
    async fn test_prepare_output_dir_clears_when_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("stale.ts"), "").unwrap();
        prepare_output_dir(dir.path(), true).await.unwrap();
        assert!(dir.path().is_dir());
        assert!(!dir.path().join("stale.ts").exists());
    }
}
