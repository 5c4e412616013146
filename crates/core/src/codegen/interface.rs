//! Interface units: one generated declaration per `definitions` entry.

use std::collections::{BTreeSet, HashSet};

use tracing::warn;

use super::INTERFACES_DIR;
use super::naming::sanitize_definition_name;
use super::resolver::{BasicType, ResolvedType, TypeResolver};
use super::types::{Emit, TsType};
use crate::swagger::Document;

/// How the definition is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration {
    /// `export interface Name { ... }`
    Interface,
    /// `export type Name = ...;`
    TypeAlias,
}

/// A generated definition file.
#[derive(Debug, Clone)]
pub struct InterfaceUnit {
    /// Sanitized type name.
    pub name: String,
    /// Name as declared in `definitions`.
    pub original_name: String,
    /// Declaration form.
    pub declaration: Declaration,
    /// Resolved body.
    pub ty: ResolvedType,
    /// Other definitions this one refers to.
    pub imports: BTreeSet<String>,
}

impl InterfaceUnit {
    /// Output file relative to the output root.
    pub fn file_path(&self) -> String {
        format!("{INTERFACES_DIR}/{}.ts", self.name)
    }

    /// Interface members (`readonly id?: string`), one per property.
    ///
    /// Empty for type aliases.
    pub fn members(&self) -> Vec<String> {
        match (&self.declaration, &self.ty.ty) {
            (Declaration::Interface, TsType::Object(props)) => {
                props.iter().map(Emit::emit).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Build one unit per definition, in declaration order.
///
/// Two definitions whose names sanitize to the same type name cannot both
/// be written; the later one is skipped with a warning.
pub fn export_interfaces(document: &Document) -> Vec<InterfaceUnit> {
    let Some(definitions) = document.definitions() else {
        return Vec::new();
    };

    let resolver = TypeResolver::for_document(document);
    let mut taken = HashSet::new();
    let mut units = Vec::with_capacity(definitions.len());

    for (original_name, node) in definitions {
        let name = sanitize_definition_name(original_name);
        if !taken.insert(name.clone()) {
            warn!(
                definition = %original_name,
                type_name = %name,
                "Definition name collides with another definition after sanitizing, skipping."
            );
            continue;
        }

        let ty = resolver.resolve(node, original_name);
        let declaration = if ty.basic_type() == BasicType::Interface && ty.ty.is_object_literal() {
            Declaration::Interface
        } else {
            Declaration::TypeAlias
        };

        let mut imports = ty.imports.clone();
        imports.remove(&name);

        units.push(InterfaceUnit {
            name,
            original_name: original_name.clone(),
            declaration,
            ty,
            imports,
        });
    }

    units
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::codegen::definition_import_path;

    const PETS: &str = r##"{
  "swagger": "2.0",
  "info": { "title": "Pets", "version": "1.0" },
  "paths": {},
  "definitions": {
    "Pet": {
      "type": "object",
      "required": ["name"],
      "properties": {
        "id": { "type": "integer", "readOnly": true },
        "name": { "type": "string" },
        "parent": { "$ref": "#/definitions/Pet" },
        "owner": { "$ref": "#/definitions/Owner" }
      }
    },
    "Owner": { "allOf": [{ "$ref": "#/definitions/Person" }, { "properties": { "pets": { "type": "integer" } } }] },
    "Person": { "type": "object", "properties": { "name": { "type": "string" } } },
    "Status": { "type": "string", "enum": ["available", "sold"] },
    "Empty": { "type": "object" },
    "Pet.Status": { "type": "string" }
  }
}"##;

    fn units() -> Vec<InterfaceUnit> {
        let document = Document::from_text(PETS, "pets.json").unwrap();
        export_interfaces(&document)
    }

    #[test]
    fn test_object_definition_is_an_interface() {
        let units = units();
        let pet = &units[0];
        assert_eq!(pet.name, "Pet");
        assert_eq!(pet.declaration, Declaration::Interface);
        assert_eq!(
            pet.members(),
            [
                "readonly id?: number",
                "name: string",
                "parent?: Pet",
                "owner?: Owner"
            ]
        );
        // self-references need no import
        assert_eq!(pet.imports.iter().collect::<Vec<_>>(), ["Owner"]);
        assert_eq!(pet.file_path(), "interfaces/Pet.ts");
        assert_eq!(definition_import_path(INTERFACES_DIR, "Owner"), "./Owner");
    }

    #[test]
    fn test_other_definitions_are_type_aliases() {
        let units = units();
        let owner = &units[1];
        assert_eq!(owner.declaration, Declaration::TypeAlias);
        assert_eq!(owner.ty.expression(), "Person & { pets?: number }");
        assert!(owner.members().is_empty());

        let status = &units[3];
        assert_eq!(status.declaration, Declaration::TypeAlias);
        assert_eq!(status.ty.expression(), "\"available\" | \"sold\"");
    }

    #[test]
    fn test_empty_object_and_sanitized_names() {
        let units = units();
        let empty = &units[4];
        assert_eq!(empty.declaration, Declaration::Interface);
        assert!(empty.members().is_empty());
        assert!(empty.ty.degraded);

        let status = &units[5];
        assert_eq!(status.name, "Pet_Status");
        assert_eq!(status.original_name, "Pet.Status");
    }

    #[test]
    fn test_reserved_definition_names_are_prefixed() {
        let document = Document::from_text(
            r##"{ "swagger": "2.0", "info": { "title": "x", "version": "1" }, "paths": {},
                 "definitions": {
                   "default": { "type": "object", "properties": { "next": { "$ref": "#/definitions/delete" } } },
                   "delete": { "type": "string" }
                 } }"##,
            "reserved.json",
        )
        .unwrap();
        let units = export_interfaces(&document);

        assert_eq!(units[0].name, "_default");
        assert_eq!(units[0].original_name, "default");
        assert_eq!(units[0].file_path(), "interfaces/_default.ts");
        assert_eq!(units[0].members(), ["next?: _delete"]);
        assert_eq!(units[0].imports.iter().collect::<Vec<_>>(), ["_delete"]);
        assert_eq!(units[1].name, "_delete");
    }
}
