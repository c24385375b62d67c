//! World loader with validation
//!
//! Parses a world definition and builds the registry, the type hierarchy and
//! the cascade rules, rejecting anything inconsistent.

use crate::cascade::{CascadeRules, FieldRef};
use crate::config::format::{ColumnSpec, TableSpec, TypeSpec, WorldFile};
use crate::errors::{ConfigError, Result, WsError, WsErrorKind};
use crate::model::{ColumnDef, ColumnType, TableDef, Value};
use crate::schema_registry::SchemaRegistry;
use crate::type_hierarchy::{TypeDecl, TypeHierarchy};
use crate::world::World;
use std::fs;
use std::path::Path;

/// Load a world definition from a YAML file
///
/// # Errors
///
/// `Io` if the file can not be read, `InvalidConfig`/`CycleDetected` if the
/// definition is malformed or inconsistent.
pub fn load_world_file(path: &Path) -> Result<World> {
    let content = fs::read_to_string(path).map_err(|e| {
        WsError::new(WsErrorKind::Io)
            .with_op("load_world")
            .with_message(format!(
                "Failed to read world file {}: {}",
                path.display(),
                e
            ))
    })?;
    load_world_str(&content)
}

/// Load a world definition from YAML text
///
/// # Errors
///
/// `InvalidConfig`/`CycleDetected` if the definition is malformed or
/// inconsistent.
pub fn load_world_str(content: &str) -> Result<World> {
    let file: WorldFile = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
        reason: e.to_string(),
    })?;
    let world = build_world(file)?;
    tracing::debug!(
        tables = world.schema().tables().len(),
        types = world.types().type_keys().count(),
        "world loaded"
    );
    Ok(world)
}

/// Build a world from an already parsed definition
///
/// # Errors
///
/// Returns the first inconsistency found.
pub fn build_world(file: WorldFile) -> std::result::Result<World, ConfigError> {
    let tables = file
        .tables
        .into_iter()
        .map(build_table)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let schema = SchemaRegistry::new(tables)?;

    let decls = file.types.into_iter().map(build_type).collect();
    let types = TypeHierarchy::new(decls, &schema)?;

    let discriminator = FieldRef::new(file.discriminator.table, file.discriminator.field);
    let table = schema
        .table(&discriminator.table)
        .map_err(|_| ConfigError::UnknownTable {
            context: "discriminator".to_string(),
            table: discriminator.table.clone(),
        })?;
    if table.column(&discriminator.field).is_none() {
        return Err(ConfigError::UnknownColumn {
            context: "discriminator".to_string(),
            table: discriminator.table.clone(),
            column: discriminator.field.clone(),
        });
    }

    let rules = file.cascades.unwrap_or_else(CascadeRules::default_rules);
    let cascades = CascadeRules::new(rules, &schema, &types)?;

    Ok(World::new(schema, types, cascades, discriminator))
}

fn build_table(spec: TableSpec) -> std::result::Result<TableDef, ConfigError> {
    let mut pk = ColumnDef::new(spec.primary_key, ColumnType::Integer);
    pk.primary_key = true;

    let mut columns = vec![pk];
    for column in spec.columns {
        columns.push(build_column(&spec.name, column)?);
    }
    TableDef::new(spec.name, columns)
}

fn build_column(table: &str, spec: ColumnSpec) -> std::result::Result<ColumnDef, ConfigError> {
    let default = match &spec.default {
        Some(raw) => spec
            .ty
            .parse(raw)
            .map_err(|reason| ConfigError::InvalidDefault {
                table: table.to_string(),
                column: spec.name.clone(),
                reason,
            })?,
        None => Value::Null,
    };

    if let (Some(choices), Some(raw)) = (&spec.choices, &spec.default) {
        if !choices.contains(raw) {
            return Err(ConfigError::InvalidDefault {
                table: table.to_string(),
                column: spec.name.clone(),
                reason: format!("'{}' is not one of the choices", raw),
            });
        }
    }

    let mut column = ColumnDef::new(spec.name, spec.ty);
    if let Some(label) = spec.label {
        column.label = label;
    }
    column.business_key = spec.business_key;
    column.required = spec.required;
    column.references = spec.references;
    column.max_length = spec.max_length;
    column.default = default;
    column.choices = spec.choices;
    column.help_text = spec.help_text;
    Ok(column)
}

fn build_type(spec: TypeSpec) -> TypeDecl {
    TypeDecl {
        name: spec.name.unwrap_or_else(|| spec.key.clone()),
        key: spec.key,
        description: spec.description,
        parent: spec.parent,
        tables: spec.tables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: &str = r#"
tables:
  - name: object
    columns:
      - { name: key, business_key: true, label: Key }
      - { name: element_type }
      - { name: name }
  - name: world_area
    columns:
      - { name: key, business_key: true }
  - name: world_room
    columns:
      - { name: key, business_key: true }
      - { name: location, references: world_area }
types:
  - { key: OBJECT, name: Object, tables: [object] }
  - { key: AREA, name: Area, parent: OBJECT, tables: [world_area] }
  - { key: ROOM, name: Room, parent: OBJECT, tables: [world_room] }
discriminator: { table: object, field: element_type }
cascades:
  - when: AREA
    rewrite:
      - { table: world_room, field: location }
"#;

    #[test]
    fn test_load_world() {
        let world = load_world_str(WORLD).unwrap();
        assert_eq!(
            world.types().tables_for("ROOM").unwrap(),
            ["object", "world_room"]
        );
        assert_eq!(world.discriminator().field, "element_type");
        let object = world.schema().table("object").unwrap();
        assert_eq!(object.column("key").map(|c| c.label.as_str()), Some("Key"));
        assert_eq!(world.cascades().rules().len(), 1);
    }

    #[test]
    fn test_yaml_syntax_error_is_invalid_config() {
        let err = load_world_str("tables: [").unwrap_err();
        assert_eq!(err.kind(), WsErrorKind::InvalidConfig);
        assert_eq!(err.op(), Some("load_world"));
    }

    #[test]
    fn test_invalid_default_rejected() {
        let yaml = r#"
tables:
  - name: object
    columns:
      - { name: key, business_key: true }
      - { name: weight, type: integer, default: heavy }
discriminator: { table: object, field: key }
cascades: []
"#;
        let err = load_world_str(yaml).unwrap_err();
        assert_eq!(err.kind(), WsErrorKind::InvalidConfig);
        assert_eq!(err.table(), Some("object"));
    }

    #[test]
    fn test_unknown_discriminator_column_rejected() {
        let yaml = r#"
tables:
  - name: object
    columns:
      - { name: key, business_key: true }
discriminator: { table: object, field: element_type }
cascades: []
"#;
        let err = load_world_str(yaml).unwrap_err();
        assert_eq!(err.kind(), WsErrorKind::InvalidConfig);
    }

    #[test]
    fn test_omitted_cascades_need_area_and_room() {
        let yaml = r#"
tables:
  - name: object
    columns:
      - { name: key, business_key: true }
      - { name: element_type }
types:
  - { key: OBJECT, tables: [object] }
discriminator: { table: object, field: element_type }
"#;
        let err = load_world_str(yaml).unwrap_err();
        assert_eq!(err.kind(), WsErrorKind::InvalidConfig);
        assert_eq!(err.key(), Some("AREA"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_world_file(Path::new("/nonexistent/world.yaml")).unwrap_err();
        assert_eq!(err.kind(), WsErrorKind::Io);
    }
}
