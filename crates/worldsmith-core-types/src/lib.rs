//! Core types shared across Worldsmith facilities
//!
//! - **Schema constants**: canonical field keys and event names used by the
//!   logging facility and by log assertions in tests

pub mod schema;
