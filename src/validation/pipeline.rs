//! Combined validation: field rules first, then references and uniqueness.
//!
//! Lookups run only when field-level validation passed, so ill-typed
//! identifiers never reach the storage collaborator. Partial updates go
//! through the same phases; only the fields they carry are checked.

use serde_json::Value as Json;

use crate::document::Document;
use crate::observability::{log_event_with_fields, Event, ValidationMetrics};
use crate::schema::{EntityKind, SchemaError, SchemaRegistry};

use super::errors::ValidationOutcome;
use super::references::{ReferenceChecker, ReferenceLookup};
use super::validator::{FieldPolicy, ValidationMode, Validator};
use super::violation::ValidationResult;

/// Validates documents end to end against a frozen registry.
///
/// Holds no per-call state; one instance can serve parallel callers.
#[derive(Debug)]
pub struct DocumentValidator<'a> {
    registry: &'a SchemaRegistry,
    policy: FieldPolicy,
    metrics: ValidationMetrics,
}

impl<'a> DocumentValidator<'a> {
    /// # Errors
    ///
    /// `RegistryNotFrozen` if the registry is still under construction.
    pub fn new(registry: &'a SchemaRegistry) -> Result<Self, SchemaError> {
        if !registry.is_frozen() {
            return Err(SchemaError::RegistryNotFrozen);
        }
        Ok(Self {
            registry,
            policy: FieldPolicy::Open,
            metrics: ValidationMetrics::new(),
        })
    }

    pub fn with_policy(mut self, policy: FieldPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        self.registry
    }

    pub fn metrics(&self) -> &ValidationMetrics {
        &self.metrics
    }

    /// Validates `document` as a `kind` record.
    ///
    /// # Errors
    ///
    /// - `UnknownKind` if `kind` is not registered
    /// - `ReferenceCheckUnavailable` if the lookup fails; the document was
    ///   neither accepted nor rejected
    pub fn validate<L: ReferenceLookup + ?Sized>(
        &self,
        kind: EntityKind,
        document: &Document,
        lookup: &L,
    ) -> ValidationOutcome<ValidationResult> {
        self.validate_in(ValidationMode::Full, kind, document, lookup)
    }

    /// Validates `document` as a partial update of a `kind` record.
    ///
    /// Uniqueness excludes the record named by the patch's `_id`, if any.
    pub fn validate_patch<L: ReferenceLookup + ?Sized>(
        &self,
        kind: EntityKind,
        document: &Document,
        lookup: &L,
    ) -> ValidationOutcome<ValidationResult> {
        self.validate_in(ValidationMode::Partial, kind, document, lookup)
    }

    pub fn validate_in<L: ReferenceLookup + ?Sized>(
        &self,
        mode: ValidationMode,
        kind: EntityKind,
        document: &Document,
        lookup: &L,
    ) -> ValidationOutcome<ValidationResult> {
        let mut result = Validator::new(self.registry)
            .with_policy(self.policy)
            .with_mode(mode)
            .validate(kind, document)?;

        if result.is_valid() {
            let checker = ReferenceChecker::new(self.registry).with_metrics(&self.metrics);
            let dangling = checker.check_references(kind, document, lookup)?;
            let duplicates = checker.check_uniqueness(kind, document, lookup)?;
            result.merge(dangling);
            result.merge(duplicates);
        }

        self.record(kind, &result);
        Ok(result)
    }

    /// Decodes Extended JSON, then validates.
    pub fn validate_json<L: ReferenceLookup + ?Sized>(
        &self,
        kind: EntityKind,
        json: &Json,
        lookup: &L,
    ) -> ValidationOutcome<ValidationResult> {
        let document = Document::from_json(json)?;
        self.validate(kind, &document, lookup)
    }

    fn record(&self, kind: EntityKind, result: &ValidationResult) {
        self.metrics.increment_validated();
        if result.is_valid() {
            self.metrics.increment_accepted();
            log_event_with_fields(
                Event::DocumentAccepted,
                &[("kind", kind.collection_name())],
            );
        } else {
            let count = result.violations.len();
            self.metrics.increment_rejected();
            self.metrics.add_violations(count as u64);
            let count = count.to_string();
            log_event_with_fields(
                Event::DocumentRejected,
                &[("kind", kind.collection_name()), ("violations", count.as_str())],
            );
        }
    }
}

/// One-shot validation with the default (open) field policy.
pub fn validate_document<L: ReferenceLookup + ?Sized>(
    registry: &SchemaRegistry,
    kind: EntityKind,
    document: &Document,
    lookup: &L,
) -> ValidationOutcome<ValidationResult> {
    DocumentValidator::new(registry)?.validate(kind, document, lookup)
}

/// One-shot partial-update validation with the default field policy.
pub fn validate_patch<L: ReferenceLookup + ?Sized>(
    registry: &SchemaRegistry,
    kind: EntityKind,
    document: &Document,
    lookup: &L,
) -> ValidationOutcome<ValidationResult> {
    DocumentValidator::new(registry)?.validate_patch(kind, document, lookup)
}
