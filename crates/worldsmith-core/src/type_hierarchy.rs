//! Type Hierarchy Resolver
//!
//! Entity types form a rooted forest. Each type stores its entities across an
//! ordered list of tables: its parent's tables followed by its own. Ancestor
//! sets are computed once at construction, so "is-a" checks are set lookups.

use crate::errors::{ConfigError, Result, WsError};
use crate::schema_registry::SchemaRegistry;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Declaration of one entity type, as read from the world definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub key: String,
    pub name: String,
    pub description: String,
    pub parent: Option<String>,
    /// Tables this type adds on top of its parent's
    pub tables: Vec<String>,
}

/// Display metadata for a type, used to build type-selection choices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub key: String,
    pub name: String,
    pub description: String,
    pub parent: Option<String>,
}

impl TypeInfo {
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.key)
    }
}

#[derive(Debug, Clone)]
struct TypeNode {
    info: TypeInfo,
    tables: Vec<String>,
    /// The type itself and every ancestor
    ancestors: HashSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    nodes: Vec<TypeNode>,
    index: HashMap<String, usize>,
}

impl TypeHierarchy {
    /// Build the forest and verify it
    ///
    /// # Errors
    ///
    /// Fails on duplicate keys, unknown parents, cycles, and tables that are
    /// unregistered or have no business key.
    pub fn new(
        decls: Vec<TypeDecl>,
        schema: &SchemaRegistry,
    ) -> std::result::Result<Self, ConfigError> {
        let mut index = HashMap::new();
        for (i, decl) in decls.iter().enumerate() {
            if index.insert(decl.key.clone(), i).is_some() {
                return Err(ConfigError::DuplicateType {
                    type_key: decl.key.clone(),
                });
            }
        }

        for decl in &decls {
            if let Some(parent) = &decl.parent {
                if !index.contains_key(parent) {
                    return Err(ConfigError::UnknownParent {
                        type_key: decl.key.clone(),
                        parent: parent.clone(),
                    });
                }
            }
            for table in &decl.tables {
                let def = schema
                    .table(table)
                    .map_err(|_| ConfigError::UnknownTypeTable {
                        type_key: decl.key.clone(),
                        table: table.clone(),
                    })?;
                if def.business_key().is_none() {
                    return Err(ConfigError::MissingBusinessKey {
                        type_key: decl.key.clone(),
                        table: table.clone(),
                    });
                }
            }
        }

        let mut nodes = Vec::with_capacity(decls.len());
        for decl in &decls {
            let chain = ancestor_chain(decl, &decls, &index)?;

            let mut tables: Vec<String> = Vec::new();
            for &i in chain.iter().rev() {
                for table in &decls[i].tables {
                    if !tables.contains(table) {
                        tables.push(table.clone());
                    }
                }
            }

            nodes.push(TypeNode {
                info: TypeInfo {
                    key: decl.key.clone(),
                    name: decl.name.clone(),
                    description: decl.description.clone(),
                    parent: decl.parent.clone(),
                },
                tables,
                ancestors: chain.iter().map(|&i| decls[i].key.clone()).collect(),
            });
        }

        Ok(Self { nodes, index })
    }

    fn node(&self, type_key: &str) -> Option<&TypeNode> {
        self.index.get(type_key).map(|&i| &self.nodes[i])
    }

    /// Ordered tables storing an entity of this type
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` if the type is not registered.
    pub fn tables_for(&self, type_key: &str) -> Result<&[String]> {
        self.node(type_key)
            .map(|n| n.tables.as_slice())
            .ok_or_else(|| WsError::unknown_type(type_key))
    }

    /// Every type equal to or descending from `base`
    ///
    /// Empty when `base` is unknown or has no registered descendants.
    pub fn candidates_under(&self, base: &str) -> BTreeMap<String, TypeInfo> {
        self.nodes
            .iter()
            .filter(|n| n.ancestors.contains(base))
            .map(|n| (n.info.key.clone(), n.info.clone()))
            .collect()
    }

    /// Whether `type_key` is `base` or one of its descendants
    pub fn is_descendant(&self, type_key: &str, base: &str) -> bool {
        self.node(type_key)
            .map(|n| n.ancestors.contains(base))
            .unwrap_or(false)
    }

    pub fn get(&self, type_key: &str) -> Option<&TypeInfo> {
        self.node(type_key).map(|n| &n.info)
    }

    pub fn contains(&self, type_key: &str) -> bool {
        self.index.contains_key(type_key)
    }

    /// Type keys in registration order
    pub fn type_keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.info.key.as_str())
    }

    /// Union of every type's tables, in first-seen registration order
    pub fn all_tables(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut tables = Vec::new();
        for node in &self.nodes {
            for table in &node.tables {
                if seen.insert(table.as_str()) {
                    tables.push(table.clone());
                }
            }
        }
        tables
    }
}

/// Indexes of `decl` and its ancestors, nearest first
fn ancestor_chain(
    decl: &TypeDecl,
    decls: &[TypeDecl],
    index: &HashMap<String, usize>,
) -> std::result::Result<Vec<usize>, ConfigError> {
    let mut chain = vec![index[&decl.key]];
    let mut current = decl;
    while let Some(parent) = &current.parent {
        let i = index[parent];
        if chain.contains(&i) {
            return Err(ConfigError::CycleDetected {
                type_key: decl.key.clone(),
            });
        }
        chain.push(i);
        current = &decls[i];
    }
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WsErrorKind;
    use crate::model::{ColumnDef, ColumnType, TableDef};

    fn keyed(name: &str) -> TableDef {
        let mut key = ColumnDef::new("key", ColumnType::Text);
        key.business_key = true;
        TableDef::new(name, vec![key]).unwrap()
    }

    fn decl(key: &str, parent: Option<&str>, tables: &[&str]) -> TypeDecl {
        TypeDecl {
            key: key.to_string(),
            name: key.to_lowercase(),
            description: String::new(),
            parent: parent.map(str::to_string),
            tables: tables.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new(vec![keyed("object"), keyed("world_object"), keyed("world_room")])
            .unwrap()
    }

    #[test]
    fn test_child_extends_parent_tables() {
        let types = TypeHierarchy::new(
            vec![
                decl("OBJECT", None, &["object"]),
                decl("WORLD_OBJECT", Some("OBJECT"), &["world_object"]),
            ],
            &registry(),
        )
        .unwrap();

        assert_eq!(types.tables_for("OBJECT").unwrap(), ["object"]);
        assert_eq!(
            types.tables_for("WORLD_OBJECT").unwrap(),
            ["object", "world_object"]
        );
    }

    #[test]
    fn test_parent_may_be_declared_after_child() {
        let types = TypeHierarchy::new(
            vec![
                decl("ROOM", Some("OBJECT"), &["world_room"]),
                decl("OBJECT", None, &["object"]),
            ],
            &registry(),
        )
        .unwrap();
        assert!(types.is_descendant("ROOM", "OBJECT"));
        assert_eq!(types.tables_for("ROOM").unwrap(), ["object", "world_room"]);
    }

    #[test]
    fn test_unknown_type() {
        let types = TypeHierarchy::new(vec![decl("OBJECT", None, &["object"])], &registry())
            .unwrap();
        let err = types.tables_for("DRAGON").unwrap_err();
        assert_eq!(err.kind(), WsErrorKind::UnknownType);
        assert!(types.candidates_under("DRAGON").is_empty());
        assert!(!types.is_descendant("DRAGON", "OBJECT"));
    }

    #[test]
    fn test_cycle_rejected() {
        let err = TypeHierarchy::new(
            vec![
                decl("A", Some("B"), &["object"]),
                decl("B", Some("A"), &["object"]),
            ],
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::CycleDetected { .. }));
    }

    #[test]
    fn test_table_without_business_key_rejected() {
        let schema = SchemaRegistry::new(vec![TableDef::new("loot", vec![]).unwrap()]).unwrap();
        let err = TypeHierarchy::new(vec![decl("LOOT", None, &["loot"])], &schema).unwrap_err();
        assert!(matches!(err, ConfigError::MissingBusinessKey { .. }));
    }

    #[test]
    fn test_all_tables_deduplicated() {
        let types = TypeHierarchy::new(
            vec![
                decl("OBJECT", None, &["object"]),
                decl("WORLD_OBJECT", Some("OBJECT"), &["world_object"]),
                decl("ROOM", Some("OBJECT"), &["world_room"]),
            ],
            &registry(),
        )
        .unwrap();
        assert_eq!(
            types.all_tables(),
            vec!["object", "world_object", "world_room"]
        );
    }
}
