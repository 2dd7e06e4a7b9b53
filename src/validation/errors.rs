//! Validation errors
//!
//! These are faults, not findings: an unknown kind (caller error), an
//! undecodable document, or a storage collaborator that could not answer.
//! Data-quality problems are `Violation`s inside a `ValidationResult`.

use thiserror::Error;

use crate::document::DocumentError;
use crate::schema::{EntityKind, SchemaError};

use super::references::LookupError;

/// Result type for validation calls
pub type ValidationOutcome<T> = Result<T, ValidationError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Registry-level failure, e.g. `UnknownKind`
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Input could not be decoded into a document
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// The lookup collaborator failed; the document could not be verified
    #[error("Could not verify {kind}.{field}: {source}")]
    ReferenceCheckUnavailable {
        kind: EntityKind,
        field: String,
        #[source]
        source: LookupError,
    },
}

impl ValidationError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::Schema(e) => e.code(),
            ValidationError::Document(e) => e.code(),
            ValidationError::ReferenceCheckUnavailable { .. } => "RATO_REFERENCE_CHECK_UNAVAILABLE",
        }
    }

    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ValidationError::ReferenceCheckUnavailable { .. })
    }
}
