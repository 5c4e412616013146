//! TypeScript code generation models.
//!
//! Everything in here is pure: documents go in, plain data for the
//! templates comes out. Nothing touches the filesystem except
//! `DirEntry::scan` in `client_index`.

pub mod client_index;
pub mod interface;
pub mod naming;
pub mod operation;
pub mod resolver;
pub mod resource;
pub mod types;

pub use client_index::{
    API_CLIENT_NAME, ApiNode, ClientIndex, DirEntry, FileEntry, ImportGroup, IndexFile,
    NameRegistry,
};
pub use interface::{Declaration, InterfaceUnit, export_interfaces};
pub use operation::{Description, HttpMethod, OperationDescriptor, ParameterDescriptor};
pub use resolver::{BasicType, ResolvedType, TypeResolver};
pub use resource::{REST_DIR, ResourceUnit, export_services};

/// Top-level output directory for definition files.
pub const INTERFACES_DIR: &str = "interfaces";

/// Module specifier of a definition file, seen from `from_dir`.
pub fn definition_import_path(from_dir: &str, definition: &str) -> String {
    naming::relative_import_path(from_dir, &format!("{INTERFACES_DIR}/{definition}"))
}
