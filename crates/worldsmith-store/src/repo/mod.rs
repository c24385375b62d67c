//! Repository layer over the world tables

mod filter;
mod record_store;
mod sql_value;
pub mod system_data;

pub use filter::{Filter, FilterIter, Predicate};
pub use record_store::{PreparedWrite, RecordStore, TableStore};
