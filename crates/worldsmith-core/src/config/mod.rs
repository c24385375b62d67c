//! World configuration: YAML format and loader

pub mod format;
pub mod loader;

pub use format::WorldFile;
pub use loader::{build_world, load_world_file, load_world_str};
