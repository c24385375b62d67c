//! World data model: column types, values, table definitions and records

pub mod column;
pub mod record;
pub mod table;
pub mod value;

pub use column::{ColumnType, TypeCodec};
pub use record::{FieldValues, Record};
pub use table::{ColumnDef, TableDef};
pub use value::Value;
