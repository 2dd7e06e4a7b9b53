//! Errors raised while reading a document off the wire

use thiserror::Error;

/// Result type for document decoding
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Document decoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// Top-level input was not a JSON object
    #[error("Document must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// `$oid` payload is not 24 hex characters
    #[error("Invalid objectId '{0}': expected 24 hex characters")]
    InvalidObjectId(String),

    /// `$date` payload is neither RFC 3339, YYYY-MM-DD nor epoch millis
    #[error("Invalid date '{0}'")]
    InvalidDate(String),

    /// `$numberDecimal` / `$numberInt` / `$numberLong` payload did not parse
    #[error("Invalid {tag} value '{text}'")]
    InvalidNumber {
        /// Extended JSON tag, e.g. `$numberDecimal`
        tag: &'static str,
        /// Offending text
        text: String,
    },
}

impl DocumentError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            DocumentError::NotAnObject(_) => "RATO_DOCUMENT_NOT_OBJECT",
            DocumentError::InvalidObjectId(_) => "RATO_DOCUMENT_INVALID_OBJECT_ID",
            DocumentError::InvalidDate(_) => "RATO_DOCUMENT_INVALID_DATE",
            DocumentError::InvalidNumber { .. } => "RATO_DOCUMENT_INVALID_NUMBER",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            DocumentError::NotAnObject("array").code(),
            "RATO_DOCUMENT_NOT_OBJECT"
        );
        assert_eq!(
            DocumentError::InvalidObjectId("zz".into()).code(),
            "RATO_DOCUMENT_INVALID_OBJECT_ID"
        );
    }

    #[test]
    fn test_number_error_display() {
        let err = DocumentError::InvalidNumber {
            tag: "$numberDecimal",
            text: "ten".into(),
        };
        let display = err.to_string();
        assert!(display.contains("$numberDecimal"));
        assert!(display.contains("ten"));
    }
}
