//! Lifecycle macros for engine commands
//!
//! A command emits `start` on entry and exactly one of `end` or
//! `end_error` on exit. All three carry `component` (the calling module)
//! and `op` (the command name); extra `key = value` fields pass through to
//! `tracing` unchanged. Store and core code log with plain
//! `tracing::debug!` instead.

#[doc(hidden)]
#[macro_export]
macro_rules! __op_event {
    ($level:ident, $op:expr, $event:ident $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $crate::worldsmith_core_types::schema::$event,
            $($($field)*)?
        )
    };
}

/// Entry into a command, at `INFO`
///
/// ```
/// # use worldsmith_core::log_op_start;
/// log_op_start!("export_all");
/// log_op_start!("save_entity", type_key = "ROOM", groups = 2);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__op_event!(info, $op, EVENT_START $(, $($field)*)?)
    };
}

/// Successful exit, at `INFO`; `duration_ms` comes first
///
/// ```
/// # use worldsmith_core::log_op_end;
/// log_op_end!("import_table", duration_ms = 7, inserted = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__op_event!(info, $op, EVENT_END, duration_ms = $duration $(, $($field)*)?)
    };
}

/// Failed exit, at `ERROR`, tagged with the error's kind and stable code
///
/// `$err` is anything convertible into `WsError`.
///
/// ```
/// # use worldsmith_core::{log_op_error, errors::WsError};
/// let err = WsError::unknown_type("DRAGON");
/// log_op_error!("query_entity", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let failure: $crate::errors::WsError = $err.into();
        $crate::__op_event!(
            error,
            $op,
            EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?failure.kind(),
            err_code = failure.code()
            $(, $($field)*)?
        )
    }};
}
