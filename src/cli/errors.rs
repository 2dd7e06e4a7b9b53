//! CLI-specific error types
//!
//! Every CLI error ends the command; per-document problems in `check` are
//! reported inline and do not reach this type.

use std::io;

use thiserror::Error;

use crate::document::DocumentError;
use crate::schema::SchemaError;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file unreadable or invalid
    #[error("{0}")]
    Config(String),

    /// stdin/stdout failure or undecodable input
    #[error("{0}")]
    Io(String),

    /// Input decoded but not shaped as a request
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl CliError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "RATO_CLI_CONFIG_ERROR",
            Self::Io(_) => "RATO_CLI_IO_ERROR",
            Self::InvalidRequest(_) => "RATO_CLI_INVALID_REQUEST",
            Self::Schema(e) => e.code(),
            Self::Document(e) => e.code(),
            Self::Validation(e) => e.code(),
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
