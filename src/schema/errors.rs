//! Schema error types
//!
//! Error codes:
//! - RATO_UNKNOWN_KIND (REJECT)
//! - RATO_DUPLICATE_KIND (FATAL)
//! - RATO_INVALID_DEFINITION (FATAL)
//! - RATO_REGISTRY_FROZEN (FATAL)
//! - RATO_REGISTRY_NOT_FROZEN (FATAL)
//! - RATO_MALFORMED_SCHEMA_FILE (FATAL)
//! - RATO_SCHEMA_FILE_WRITE (REJECT)
//!
//! Registry misuse happens at startup and is fatal. An unknown kind is a
//! caller error on an otherwise healthy process.

use std::fmt;

use thiserror::Error;

use super::entity::EntityKind;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller request rejected
    Reject,
    /// Startup must abort
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Kind is not registered (or does not name a kind at all)
    #[error("Unknown entity kind '{0}'")]
    UnknownKind(String),

    /// Kind registered twice
    #[error("Entity kind '{0}' is already registered")]
    DuplicateKind(EntityKind),

    /// Definition violates a structural invariant
    #[error("Invalid definition for '{kind}': {reason}")]
    InvalidDefinition { kind: EntityKind, reason: String },

    /// `register` after `freeze`
    #[error("Schema registry is frozen")]
    RegistryFrozen,

    /// Validation requested against a registry still under construction
    #[error("Schema registry must be frozen before validating documents")]
    RegistryNotFrozen,

    /// Schema definitions file unreadable or malformed
    #[error("Malformed schema file '{path}': {reason}")]
    MalformedSchemaFile { path: String, reason: String },

    /// Schema definitions could not be written out
    #[error("Cannot write schema file '{path}': {reason}")]
    SchemaFileWrite { path: String, reason: String },
}

impl SchemaError {
    pub(crate) fn invalid(kind: EntityKind, reason: impl Into<String>) -> Self {
        SchemaError::InvalidDefinition {
            kind,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::MalformedSchemaFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn write_failed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::SchemaFileWrite {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::UnknownKind(_) => "RATO_UNKNOWN_KIND",
            SchemaError::DuplicateKind(_) => "RATO_DUPLICATE_KIND",
            SchemaError::InvalidDefinition { .. } => "RATO_INVALID_DEFINITION",
            SchemaError::RegistryFrozen => "RATO_REGISTRY_FROZEN",
            SchemaError::RegistryNotFrozen => "RATO_REGISTRY_NOT_FROZEN",
            SchemaError::MalformedSchemaFile { .. } => "RATO_MALFORMED_SCHEMA_FILE",
            SchemaError::SchemaFileWrite { .. } => "RATO_SCHEMA_FILE_WRITE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaError::UnknownKind(_) | SchemaError::SchemaFileWrite { .. } => Severity::Reject,
            _ => Severity::Fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
