//! Generate a typed Axios client from a Swagger 2.0 document.
//!
//! ```text
//! input (file or URL) -> Document -> ResourceUnit / InterfaceUnit -> .ts files
//!                                                  written tree -> APIClient.ts, index.ts
//! ```
//!
//! [`run`] does the whole thing. The pieces are public for callers that
//! want the rendered files without touching the filesystem
//! ([`load_document`] and [`generate_files`]).

pub mod codegen;
mod error;
mod generator;
mod input;
pub mod render;
pub mod swagger;

pub use error::{GenerateError, Result};
pub use generator::{
    GenerateOptions, GenerateSummary, GeneratedFile, generate_files, generate_index_files,
    load_document, prepare_output_dir, run, write_client,
};
pub use input::InputSource;
pub use swagger::Document;
