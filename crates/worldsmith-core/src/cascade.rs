//! Key-rename cascade rules
//!
//! When an entity's business key changes, other tables that store that key
//! in a cross-reference column must follow. Which columns follow is decided
//! by the entity's category: a rule applies to every type that is-a its
//! `when` type.

use crate::errors::ConfigError;
use crate::schema_registry::SchemaRegistry;
use crate::type_hierarchy::TypeHierarchy;
use serde::{Deserialize, Serialize};

/// A column whose values are rewritten from the old key to the new one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    pub table: String,
    pub field: String,
}

impl FieldRef {
    pub fn new(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            field: field.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeRule {
    /// Category type key; the rule fires for this type and its descendants
    pub when: String,
    pub rewrite: Vec<FieldRef>,
}

#[derive(Debug, Clone, Default)]
pub struct CascadeRules {
    rules: Vec<CascadeRule>,
}

impl CascadeRules {
    /// Areas own rooms; rooms own exits, placed objects and NPCs.
    pub fn default_rules() -> Vec<CascadeRule> {
        vec![
            CascadeRule {
                when: "AREA".to_string(),
                rewrite: vec![FieldRef::new("world_room", "location")],
            },
            CascadeRule {
                when: "ROOM".to_string(),
                rewrite: vec![
                    FieldRef::new("world_exit", "location"),
                    FieldRef::new("world_exit", "destination"),
                    FieldRef::new("world_object", "location"),
                    FieldRef::new("world_npc", "location"),
                ],
            },
        ]
    }

    /// Check every rule against the registry and hierarchy
    ///
    /// # Errors
    ///
    /// Fails when a rule names an unknown type, table or column.
    pub fn new(
        rules: Vec<CascadeRule>,
        schema: &SchemaRegistry,
        types: &TypeHierarchy,
    ) -> Result<Self, ConfigError> {
        for rule in &rules {
            if !types.contains(&rule.when) {
                return Err(ConfigError::UnknownType {
                    context: "cascades".to_string(),
                    type_key: rule.when.clone(),
                });
            }
            for target in &rule.rewrite {
                let table =
                    schema
                        .table(&target.table)
                        .map_err(|_| ConfigError::UnknownTable {
                            context: format!("cascade for {}", rule.when),
                            table: target.table.clone(),
                        })?;
                if table.column(&target.field).is_none() {
                    return Err(ConfigError::UnknownColumn {
                        context: format!("cascade for {}", rule.when),
                        table: target.table.clone(),
                        column: target.field.clone(),
                    });
                }
            }
        }
        Ok(Self { rules })
    }

    /// Columns to rewrite when an entity of `type_key` is renamed
    ///
    /// Rules are applied in declaration order; a column named by more than
    /// one matching rule is listed once.
    pub fn rewrites_for(&self, type_key: &str, types: &TypeHierarchy) -> Vec<&FieldRef> {
        let mut targets: Vec<&FieldRef> = Vec::new();
        for rule in &self.rules {
            if !types.is_descendant(type_key, &rule.when) {
                continue;
            }
            for target in &rule.rewrite {
                if !targets.contains(&target) {
                    targets.push(target);
                }
            }
        }
        targets
    }

    pub fn rules(&self) -> &[CascadeRule] {
        &self.rules
    }
}
