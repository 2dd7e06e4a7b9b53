//! Observability
//!
//! - Structured logging (JSON lines on stderr)
//! - Per-validator counters
//! - Typed lifecycle events
//!
//! Observability is read-only: nothing here changes a validation outcome.
//!
//! # Usage
//!
//! ```ignore
//! use rato_schema::observability::{Logger, Event, ValidationMetrics, log_event_with_fields};
//!
//! Logger::info("CHECK_BEGIN", &[("source", "stdin")]);
//! log_event_with_fields(Event::RegistryFrozen, &[("kinds", "24")]);
//!
//! let metrics = ValidationMetrics::new();
//! metrics.increment_validated();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, ValidationMetrics};

fn event_severity(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(event_severity(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event_severity(event), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_severity() {
        assert_eq!(event_severity(Event::StartupFailed), Severity::Fatal);
        assert_eq!(event_severity(Event::CatalogLoaded), Severity::Info);
    }

    #[test]
    fn test_log_event() {
        log_event(Event::CheckBegin);
        log_event_with_fields(Event::ConfigLoaded, &[("schema_file", "/tmp/schemas.json")]);
    }
}
