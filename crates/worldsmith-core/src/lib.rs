//! Worldsmith core
//!
//! Shape of a world dataset and the rules it obeys: column types and values,
//! the schema registry, the entity type hierarchy, key-rename cascade rules,
//! and row validation. Storage lives in `worldsmith-store`.

pub mod cascade;
pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod rules;
pub mod schema_registry;
pub mod type_hierarchy;
pub mod world;

// Used by the logging macros
pub use worldsmith_core_types;

pub use cascade::{CascadeRule, CascadeRules, FieldRef};
pub use config::{load_world_file, load_world_str};
pub use errors::{ConfigError, FieldErrors, Result, WsError, WsErrorKind};
pub use model::{ColumnDef, ColumnType, FieldValues, Record, TableDef, Value};
pub use schema_registry::SchemaRegistry;
pub use type_hierarchy::{TypeDecl, TypeHierarchy, TypeInfo};
pub use world::World;
