//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events during schema loading and validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Startup
    /// Configuration loaded
    ConfigLoaded,
    /// Built-in catalog registered
    CatalogLoaded,
    /// Schema file parsed
    SchemaFileLoaded,
    /// Registry frozen, ready to serve validators
    RegistryFrozen,
    /// Reference fixtures loaded
    FixturesLoaded,
    /// Configuration or schemas unusable (FATAL)
    StartupFailed,

    // Validation
    /// Batch check begins
    CheckBegin,
    /// Batch check complete
    CheckComplete,
    /// Document satisfied every rule
    DocumentAccepted,
    /// Document produced at least one violation
    DocumentRejected,
    /// Lookup collaborator could not answer
    ReferenceCheckFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::CatalogLoaded => "CATALOG_LOADED",
            Event::SchemaFileLoaded => "SCHEMA_FILE_LOADED",
            Event::RegistryFrozen => "REGISTRY_FROZEN",
            Event::FixturesLoaded => "FIXTURES_LOADED",
            Event::StartupFailed => "STARTUP_FAILED",

            Event::CheckBegin => "CHECK_BEGIN",
            Event::CheckComplete => "CHECK_COMPLETE",
            Event::DocumentAccepted => "DOCUMENT_ACCEPTED",
            Event::DocumentRejected => "DOCUMENT_REJECTED",
            Event::ReferenceCheckFailed => "REFERENCE_CHECK_FAILED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::StartupFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
