//! Error handling for worldsmith-store
//!
//! Wraps worldsmith-core WsError with store-specific helpers

use worldsmith_core::errors::{WsError, WsErrorKind};

/// Result type alias using WsError
pub type Result<T> = std::result::Result<T, WsError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> WsError {
    WsError::new(WsErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> WsError {
    WsError::new(WsErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> WsError {
    WsError::new(WsErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> WsError {
    WsError::new(WsErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an error for a delimited-text failure
pub fn csv_error(operation: &str, err: csv::Error) -> WsError {
    if err.is_io_error() {
        return WsError::new(WsErrorKind::Io)
            .with_op(operation.to_string())
            .with_message(err.to_string());
    }
    WsError::new(WsErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an error for a file extension with no registered format
pub fn unsupported_format(extension: &str) -> WsError {
    WsError::new(WsErrorKind::UnsupportedFormat)
        .with_message(format!("No delimited-text format for extension '{}'", extension))
}

/// Create an error for a stored value that does not match its column type
pub fn corrupt_value(table: &str, column: &str, reason: &str) -> WsError {
    WsError::new(WsErrorKind::Persistence)
        .with_op("read_record")
        .with_table(table.to_string())
        .with_message(format!("Stored value of {} is invalid: {}", column, reason))
}

/// Wrap a failure on one imported row, keeping its kind and field errors
pub fn import_row_error(table: &str, row: usize, err: WsError) -> WsError {
    let mut wrapped = WsError::new(err.kind())
        .with_op("import")
        .with_table(table.to_string())
        .with_message(format!("Import of {} failed at data row {}", table, row));
    if let Some(fields) = err.field_errors() {
        wrapped = wrapped.with_field_errors(fields.clone());
    }
    wrapped.with_source(err)
}

/// Escalate a database failure raised while writing to `TransactionFailure`
///
/// Data errors (validation, parse, unknown columns) keep their kind.
pub fn write_phase_error(err: WsError) -> WsError {
    match err.kind() {
        WsErrorKind::Persistence => WsError::transaction_failure(err),
        _ => err,
    }
}
