//! A loaded world: everything the editor and codec need to know about the
//! dataset's shape.

use crate::cascade::{CascadeRules, FieldRef};
use crate::schema_registry::SchemaRegistry;
use crate::type_hierarchy::TypeHierarchy;

#[derive(Debug, Clone)]
pub struct World {
    schema: SchemaRegistry,
    types: TypeHierarchy,
    cascades: CascadeRules,
    discriminator: FieldRef,
}

impl World {
    pub fn new(
        schema: SchemaRegistry,
        types: TypeHierarchy,
        cascades: CascadeRules,
        discriminator: FieldRef,
    ) -> Self {
        Self {
            schema,
            types,
            cascades,
            discriminator,
        }
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    pub fn types(&self) -> &TypeHierarchy {
        &self.types
    }

    pub fn cascades(&self) -> &CascadeRules {
        &self.cascades
    }

    /// Root-table column that stores an entity's concrete type key
    pub fn discriminator(&self) -> &FieldRef {
        &self.discriminator
    }
}
