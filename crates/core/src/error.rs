//! Error type for a generation run.
//!
//! Everything in here is fatal: the run stops before any output is written.
//! Recoverable problems (unresolvable references, schemas without
//! properties, ...) never show up as errors; they are logged through
//! `tracing` and the affected type falls back to a degraded form.

use std::path::PathBuf;

/// Fatal errors raised while loading, validating or writing a client.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The input file does not exist or cannot be accessed.
    #[error("Input file \"{}\" could not be found or is not readable", .0.display())]
    InputNotFound(PathBuf),

    /// The input file exists but reading it failed.
    #[error("Failed to read input file \"{}\": {source}", .path.display())]
    ReadInput {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Fetching a remote specification failed.
    #[error("Failed to fetch specification from \"{url}\": {source}")]
    FetchInput {
        /// URL that was requested.
        url: String,
        /// Underlying HTTP error.
        source: reqwest::Error,
    },

    /// The input is neither JSON nor YAML.
    #[error("Input \"{0}\" is neither valid JSON nor valid YAML.")]
    InvalidFormat(String),

    /// The document is an OpenAPI 3.x document.
    #[error("OpenAPI {0} documents are not supported. Only Swagger v2.x is supported.")]
    UnsupportedOpenApi(String),

    /// The document declares no Swagger version, or one outside 2.x.
    #[error("Only Swagger v2.x is supported (found {}).", .0.as_deref().unwrap_or("no version"))]
    UnsupportedVersion(Option<String>),

    /// The document has no `paths` attribute.
    #[error("The \"paths\" attribute is missing.")]
    MissingPaths,

    /// Structural validation reported one or more problems.
    #[error("Specification failed validation:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),

    /// The validated document could not be mapped onto the Swagger model.
    #[error("Failed to interpret specification: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// A template is not embedded in the binary.
    #[error("Template \"{0}\" is missing")]
    MissingTemplate(String),

    /// Rendering a template failed.
    #[error("Failed to render template \"{template}\": {source}")]
    Render {
        /// Template name.
        template: String,
        /// Underlying tera error.
        source: tera::Error,
    },

    /// The output directory exists and overwriting was not allowed.
    #[error("Output directory \"{}\" already exists", .0.display())]
    OutputExists(PathBuf),

    /// A filesystem operation on the output tree failed.
    #[error("Failed to write \"{}\": {source}", .path.display())]
    Io {
        /// Path that was being written, created or removed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A blocking task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl GenerateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, GenerateError>;
