use std::collections::BTreeMap;
use thiserror::Error;

/// Result type alias using WsError
pub type Result<T> = std::result::Result<T, WsError>;

/// Field name → problem description, one entry per failing field
pub type FieldErrors = BTreeMap<String, String>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every error raised by the data-editing and transfer core maps to one of
/// these kinds. Each kind has a stable code suitable for callers that need to
/// branch on failures (the HTTP layer, the CLI, tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WsErrorKind {
    // Lookup
    UnknownTable,
    UnknownType,
    NotFound,
    AmbiguousKey,

    // Input
    Validation,
    UnsupportedFormat,

    // Configuration
    InvalidConfig,
    CycleDetected,

    // Write phase
    TransactionFailure,

    // Integration/IO
    Io,
    Persistence,
    Serialization,

    // Internal
    Internal,
}

impl WsErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            WsErrorKind::UnknownTable => "ERR_UNKNOWN_TABLE",
            WsErrorKind::UnknownType => "ERR_UNKNOWN_TYPE",
            WsErrorKind::NotFound => "ERR_NOT_FOUND",
            WsErrorKind::AmbiguousKey => "ERR_AMBIGUOUS_KEY",
            WsErrorKind::Validation => "ERR_VALIDATION",
            WsErrorKind::UnsupportedFormat => "ERR_UNSUPPORTED_FORMAT",
            WsErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            WsErrorKind::CycleDetected => "ERR_CYCLE_DETECTED",
            WsErrorKind::TransactionFailure => "ERR_TRANSACTION_FAILURE",
            WsErrorKind::Io => "ERR_IO",
            WsErrorKind::Persistence => "ERR_PERSISTENCE",
            WsErrorKind::Serialization => "ERR_SERIALIZATION",
            WsErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind plus optional context: the operation, the
/// table and business key involved, per-field validation messages, and the
/// underlying error when one was wrapped (e.g. the persistence failure behind
/// a `TransactionFailure`).
#[derive(Debug, Clone, PartialEq)]
pub struct WsError {
    kind: WsErrorKind,
    op: Option<String>,
    table: Option<String>,
    key: Option<String>,
    message: String,
    field_errors: Option<FieldErrors>,
    source: Option<Box<WsError>>,
}

impl WsError {
    /// Create a new error with the specified kind
    pub fn new(kind: WsErrorKind) -> Self {
        Self {
            kind,
            op: None,
            table: None,
            key: None,
            message: String::new(),
            field_errors: None,
            source: None,
        }
    }

    /// Table is not registered in the schema registry
    pub fn unknown_table(table: impl Into<String>) -> Self {
        let table = table.into();
        Self::new(WsErrorKind::UnknownTable)
            .with_message(format!("Can not find table: {}", table))
            .with_table(table)
    }

    /// Type key is not registered in the type hierarchy
    pub fn unknown_type(type_key: impl Into<String>) -> Self {
        let type_key = type_key.into();
        Self::new(WsErrorKind::UnknownType)
            .with_message(format!("Can not find type: {}", type_key))
            .with_key(type_key)
    }

    /// Validation failure for one table, carrying per-field messages
    pub fn validation(table: impl Into<String>, field_errors: FieldErrors) -> Self {
        let table = table.into();
        Self::new(WsErrorKind::Validation)
            .with_message(format!("Invalid values for table {}", table))
            .with_table(table)
            .with_field_errors(field_errors)
    }

    /// Wrap a write-phase failure; the original error becomes the source
    pub fn transaction_failure(source: WsError) -> Self {
        Self::new(WsErrorKind::TransactionFailure)
            .with_message("Write phase failed; all changes were rolled back")
            .with_source(source)
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add table context
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add business key (or type key) context
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach per-field validation messages
    pub fn with_field_errors(mut self, field_errors: FieldErrors) -> Self {
        self.field_errors = Some(field_errors);
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: WsError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> WsErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the table context, if any
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Get the key context, if any
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get per-field validation messages, if any
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        self.field_errors.as_ref()
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&WsError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for WsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(table) = &self.table {
            write!(f, " (table: {})", table)?;
        }
        if let Some(key) = &self.key {
            write!(f, " (key: {})", key)?;
        }
        if let Some(fields) = &self.field_errors {
            for (field, problem) in fields {
                write!(f, "\n  {}: {}", field, problem)?;
            }
        }
        if let Some(source) = &self.source {
            write!(f, "\n  caused by: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for WsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Problems found while loading a world definition
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("World definition could not be parsed: {reason}")]
    Parse { reason: String },

    #[error("Invalid identifier '{name}': expected [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier { name: String },

    #[error("Table {table} is declared more than once")]
    DuplicateTable { table: String },

    #[error("Column {column} is declared more than once in table {table}")]
    DuplicateColumn { table: String, column: String },

    #[error("Table {table} declares more than one business key")]
    MultipleBusinessKeys { table: String },

    #[error("Table {table} declares more than one primary key")]
    MultiplePrimaryKeys { table: String },

    #[error("Primary key {column} of table {table} must be an integer column")]
    InvalidPrimaryKey { table: String, column: String },

    #[error("Column {table}.{column} references unknown table {target}")]
    UnknownReference {
        table: String,
        column: String,
        target: String,
    },

    #[error("Default for {table}.{column} is invalid: {reason}")]
    InvalidDefault {
        table: String,
        column: String,
        reason: String,
    },

    #[error("Type {type_key} is declared more than once")]
    DuplicateType { type_key: String },

    #[error("Type {type_key} has unknown parent {parent}")]
    UnknownParent { type_key: String, parent: String },

    #[error("Cycle detected in type hierarchy involving {type_key}")]
    CycleDetected { type_key: String },

    #[error("Type {type_key} uses unknown table {table}")]
    UnknownTypeTable { type_key: String, table: String },

    #[error("Table {table} used by type {type_key} has no business key")]
    MissingBusinessKey { type_key: String, table: String },

    #[error("Unknown table {table} in {context}")]
    UnknownTable { context: String, table: String },

    #[error("Unknown column {table}.{column} in {context}")]
    UnknownColumn {
        context: String,
        table: String,
        column: String,
    },

    #[error("Unknown type {type_key} in {context}")]
    UnknownType { context: String, type_key: String },
}

impl From<ConfigError> for WsError {
    fn from(err: ConfigError) -> Self {
        let kind = match err {
            ConfigError::CycleDetected { .. } => WsErrorKind::CycleDetected,
            _ => WsErrorKind::InvalidConfig,
        };
        let mut ws = WsError::new(kind)
            .with_op("load_world")
            .with_message(err.to_string());
        match &err {
            ConfigError::DuplicateTable { table }
            | ConfigError::DuplicateColumn { table, .. }
            | ConfigError::MultipleBusinessKeys { table }
            | ConfigError::MultiplePrimaryKeys { table }
            | ConfigError::InvalidPrimaryKey { table, .. }
            | ConfigError::UnknownReference { table, .. }
            | ConfigError::InvalidDefault { table, .. }
            | ConfigError::UnknownTypeTable { table, .. }
            | ConfigError::MissingBusinessKey { table, .. }
            | ConfigError::UnknownTable { table, .. }
            | ConfigError::UnknownColumn { table, .. } => {
                ws = ws.with_table(table.clone());
            }
            ConfigError::DuplicateType { type_key }
            | ConfigError::UnknownParent { type_key, .. }
            | ConfigError::CycleDetected { type_key }
            | ConfigError::UnknownType { type_key, .. } => {
                ws = ws.with_key(type_key.clone());
            }
            ConfigError::Parse { .. } | ConfigError::InvalidIdentifier { .. } => {}
        }
        ws
    }
}

impl From<serde_json::Error> for WsError {
    fn from(err: serde_json::Error) -> Self {
        WsError::new(WsErrorKind::Serialization).with_message(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (WsErrorKind::UnknownTable, "ERR_UNKNOWN_TABLE"),
            (WsErrorKind::UnknownType, "ERR_UNKNOWN_TYPE"),
            (WsErrorKind::NotFound, "ERR_NOT_FOUND"),
            (WsErrorKind::AmbiguousKey, "ERR_AMBIGUOUS_KEY"),
            (WsErrorKind::Validation, "ERR_VALIDATION"),
            (WsErrorKind::UnsupportedFormat, "ERR_UNSUPPORTED_FORMAT"),
            (WsErrorKind::TransactionFailure, "ERR_TRANSACTION_FAILURE"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_validation_error_carries_field_errors() {
        let mut fields = FieldErrors::new();
        fields.insert("width".to_string(), "expected an integer".to_string());
        let err = WsError::validation("world_area", fields);

        assert_eq!(err.kind(), WsErrorKind::Validation);
        assert_eq!(err.table(), Some("world_area"));
        let fields = err.field_errors().expect("field errors should be Some");
        assert_eq!(fields.get("width").map(String::as_str), Some("expected an integer"));
    }

    #[test]
    fn test_transaction_failure_keeps_source() {
        let inner = WsError::new(WsErrorKind::Persistence).with_message("disk I/O error");
        let err = WsError::transaction_failure(inner.clone());

        assert_eq!(err.kind(), WsErrorKind::TransactionFailure);
        assert_eq!(err.source_error(), Some(&inner));
        assert!(err.to_string().contains("disk I/O error"));
    }

    #[test]
    fn test_config_cycle_maps_to_cycle_kind() {
        let err: WsError = ConfigError::CycleDetected {
            type_key: "ROOM".to_string(),
        }
        .into();
        assert_eq!(err.kind(), WsErrorKind::CycleDetected);
        assert_eq!(err.key(), Some("ROOM"));
    }
}
