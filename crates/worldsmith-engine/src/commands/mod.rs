//! Command orchestration layer.
//!
//! Every public command owns its lifecycle logging (`log_op_start!`,
//! `log_op_end!`, `log_op_error!`); the store and core only emit
//! `tracing::debug!` events.

pub mod forms;
pub mod map_editor;
pub mod object_editor;
pub mod record_forms;
pub mod transfer;

pub use forms::{Choice, FieldDescriptor, TableForm};
pub use map_editor::{save_map_positions, AreaLayout, RoomPosition};
pub use object_editor::{delete_entity, query_entity, save_entity, update_object_key, GroupValues};
