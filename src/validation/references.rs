//! Reference and uniqueness checks against the storage collaborator
//!
//! The checker issues one `exists` call per reference value (every element
//! of an array field is checked independently) and one `value_in_use` call
//! per present unique field. It does not batch or cache.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::{Document, ObjectId, Value};
use crate::observability::{Event, Logger, ValidationMetrics};
use crate::schema::{EntityKind, FieldRule, ReferenceTarget, SchemaRegistry};

use super::errors::{ValidationError, ValidationOutcome};
use super::violation::Violation;

/// How a referenced record is identified
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordKey {
    /// The target's `_id`
    Id(ObjectId),
    /// A string key field of the target, e.g. `Genre.nome`
    Natural { field: String, value: String },
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Id(id) => write!(f, "_id {}", id),
            RecordKey::Natural { field, value } => write!(f, "{} '{}'", field, value),
        }
    }
}

/// Failure of the storage collaborator itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Store unreachable (connectivity, shutdown)
    #[error("Lookup unavailable: {0}")]
    Unavailable(String),

    /// Caller's deadline or cancellation propagated through the capability
    #[error("Lookup cancelled: {0}")]
    Cancelled(String),
}

/// Existence queries against persisted entities.
///
/// Implementations own latency, timeout and retry behavior.
pub trait ReferenceLookup {
    /// Does a `kind` record identified by `key` exist?
    fn exists(&self, kind: EntityKind, key: &RecordKey) -> Result<bool, LookupError>;

    /// Is `value` already held in `field` by a `kind` record other than
    /// `exclude`? Lookups that do not track uniqueness answer "no".
    fn value_in_use(
        &self,
        _kind: EntityKind,
        _field: &str,
        _value: &Value,
        _exclude: Option<&ObjectId>,
    ) -> Result<bool, LookupError> {
        Ok(false)
    }
}

impl<L: ReferenceLookup + ?Sized> ReferenceLookup for &L {
    fn exists(&self, kind: EntityKind, key: &RecordKey) -> Result<bool, LookupError> {
        (**self).exists(kind, key)
    }

    fn value_in_use(
        &self,
        kind: EntityKind,
        field: &str,
        value: &Value,
        exclude: Option<&ObjectId>,
    ) -> Result<bool, LookupError> {
        (**self).value_in_use(kind, field, value, exclude)
    }
}

/// Resolves reference fields of a document through a `ReferenceLookup`.
pub struct ReferenceChecker<'a> {
    registry: &'a SchemaRegistry,
    metrics: Option<&'a ValidationMetrics>,
}

impl<'a> ReferenceChecker<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry,
            metrics: None,
        }
    }

    /// Counts lookups in `metrics`.
    pub fn with_metrics(mut self, metrics: &'a ValidationMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Checks every present reference field. Values of the wrong type are
    /// skipped; field-level validation reports those.
    ///
    /// # Errors
    ///
    /// - `UnknownKind` if `kind` is not registered
    /// - `ReferenceCheckUnavailable` if the lookup itself fails
    pub fn check_references<L: ReferenceLookup + ?Sized>(
        &self,
        kind: EntityKind,
        document: &Document,
        lookup: &L,
    ) -> ValidationOutcome<Vec<Violation>> {
        let definition = self.registry.get(kind)?;
        let mut violations = Vec::new();

        for (rule, target) in definition.references() {
            let Some(value) = document.get(&rule.name) else {
                continue;
            };

            match value {
                Value::Array(items) => {
                    for (i, item) in items.iter().enumerate() {
                        let path = format!("{}[{}]", rule.name, i);
                        self.check_one(kind, rule, target, item, &path, lookup, &mut violations)?;
                    }
                }
                single => {
                    self.check_one(kind, rule, target, single, &rule.name, lookup, &mut violations)?
                }
            }
        }

        Ok(violations)
    }

    /// Checks every present unique field.
    pub fn check_uniqueness<L: ReferenceLookup + ?Sized>(
        &self,
        kind: EntityKind,
        document: &Document,
        lookup: &L,
    ) -> ValidationOutcome<Vec<Violation>> {
        let definition = self.registry.get(kind)?;
        let mut violations = Vec::new();

        for rule in definition.unique_fields() {
            let Some(value) = document.get(&rule.name) else {
                continue;
            };

            self.count_lookup();
            let in_use = lookup
                .value_in_use(kind, &rule.name, value, document.id())
                .map_err(|source| self.unavailable(kind, rule, source))?;

            if in_use {
                violations.push(Violation::duplicate_value(
                    &rule.name,
                    format!("another {} already uses this value", kind),
                ));
            }
        }

        Ok(violations)
    }

    #[allow(clippy::too_many_arguments)]
    fn check_one<L: ReferenceLookup + ?Sized>(
        &self,
        kind: EntityKind,
        rule: &FieldRule,
        target: &ReferenceTarget,
        value: &Value,
        path: &str,
        lookup: &L,
        violations: &mut Vec<Violation>,
    ) -> ValidationOutcome<()> {
        let Some(key) = record_key(target, value) else {
            return Ok(());
        };

        self.count_lookup();
        let exists = lookup
            .exists(target.kind, &key)
            .map_err(|source| self.unavailable(kind, rule, source))?;

        if !exists {
            violations.push(Violation::dangling_reference(path, target.kind, key));
        }
        Ok(())
    }

    fn count_lookup(&self) {
        if let Some(metrics) = self.metrics {
            metrics.increment_lookups();
        }
    }

    fn unavailable(
        &self,
        kind: EntityKind,
        rule: &FieldRule,
        source: LookupError,
    ) -> ValidationError {
        if let Some(metrics) = self.metrics {
            metrics.increment_lookup_failures();
        }
        let reason = source.to_string();
        Logger::warn(
            Event::ReferenceCheckFailed.as_str(),
            &[
                ("field", rule.name.as_str()),
                ("kind", kind.collection_name()),
                ("reason", reason.as_str()),
            ],
        );
        ValidationError::ReferenceCheckUnavailable {
            kind,
            field: rule.name.clone(),
            source,
        }
    }
}

/// Builds the lookup key for one value; `None` when the value has the wrong
/// type for the target.
fn record_key(target: &ReferenceTarget, value: &Value) -> Option<RecordKey> {
    match (&target.key_field, value) {
        (None, Value::ObjectId(id)) => Some(RecordKey::Id(*id)),
        (Some(field), Value::String(s)) => Some(RecordKey::Natural {
            field: field.clone(),
            value: s.clone(),
        }),
        _ => None,
    }
}
