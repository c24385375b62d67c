//! Canonical schema constants for structured logging and events
//!
//! These constants keep log output consistent across crates.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// World identifiers
pub const FIELD_TABLE: &str = "table";
pub const FIELD_TYPE_KEY: &str = "type_key";
pub const FIELD_BUSINESS_KEY: &str = "business_key";
pub const FIELD_FORMAT: &str = "format";

// Collection sizes
pub const FIELD_TABLE_COUNT: &str = "table_count";
pub const FIELD_ROW_COUNT: &str = "row_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
