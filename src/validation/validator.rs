//! Field-level document validation
//!
//! Validation semantics:
//! - Every required field is present (skipped for partial updates)
//! - Present declared fields match their declared type exactly (an integer
//!   satisfies a decimal field; null satisfies nothing)
//! - String length, pattern and enum constraints hold
//! - Numeric values lie inside inclusive bounds
//! - Array elements are checked one by one, reported as `field[i]`; with
//!   `uniqueItems`, a repeated element is reported at its own index
//! - Undeclared fields are ignored unless the policy is strict
//!
//! Every check runs; the result lists all violations in definition order.

use crate::document::{Document, Value};
use crate::schema::{Constraints, EntityKind, FieldRule, FieldType, SchemaRegistry, SchemaResult};

use super::violation::{ConstraintKind, ValidationResult, Violation};

/// Treatment of fields the definition does not declare
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Undeclared fields are accepted silently
    #[default]
    Open,
    /// Undeclared fields (other than `_id`) are reported
    Strict,
}

/// What the document stands for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// A whole record (insert or replace)
    #[default]
    Full,
    /// A partial update: absent fields keep their stored value, so only
    /// the fields present are checked
    Partial,
}

/// Validates documents against registry definitions. Does not mutate
/// documents and keeps no state between calls.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    registry: &'a SchemaRegistry,
    policy: FieldPolicy,
    mode: ValidationMode,
}

impl<'a> Validator<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry,
            policy: FieldPolicy::Open,
            mode: ValidationMode::Full,
        }
    }

    pub fn with_policy(mut self, policy: FieldPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn policy(&self) -> FieldPolicy {
        self.policy
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Validates `document` as a `kind` record.
    ///
    /// # Errors
    ///
    /// `UnknownKind` if `kind` is not registered. That is a caller error,
    /// not a validation failure.
    pub fn validate(
        &self,
        kind: EntityKind,
        document: &Document,
    ) -> SchemaResult<ValidationResult> {
        let definition = self.registry.get(kind)?;
        let enforce_required = self.mode == ValidationMode::Full;
        let mut violations = Vec::new();

        for rule in &definition.fields {
            match document.get(&rule.name) {
                Some(value) => check_value(
                    &rule.field_type,
                    &rule.constraints,
                    value,
                    &rule.name,
                    &mut violations,
                ),
                None if rule.required && enforce_required => {
                    violations.push(Violation::missing_field(&rule.name))
                }
                None => {}
            }
        }

        if self.policy == FieldPolicy::Strict {
            for name in document.field_names() {
                if name != "_id" && definition.field(name).is_none() {
                    violations.push(Violation::unexpected_field(name));
                }
            }
        }

        Ok(ValidationResult::from_violations(violations))
    }

    /// Validates `document` as a partial update of a `kind` record.
    pub fn validate_patch(
        &self,
        kind: EntityKind,
        document: &Document,
    ) -> SchemaResult<ValidationResult> {
        self.with_mode(ValidationMode::Partial).validate(kind, document)
    }

    /// Checks a single field's value in isolation.
    pub fn validate_field(rule: &FieldRule, value: &Value) -> Vec<Violation> {
        let mut violations = Vec::new();
        check_value(&rule.field_type, &rule.constraints, value, &rule.name, &mut violations);
        violations
    }
}

/// Type check, then constraints. Constraints on an array type apply to its
/// elements.
fn check_value(
    expected: &FieldType,
    constraints: &Constraints,
    value: &Value,
    path: &str,
    violations: &mut Vec<Violation>,
) {
    match (expected, value) {
        (FieldType::Array { items }, Value::Array(elements)) => {
            for (i, element) in elements.iter().enumerate() {
                let element_path = format!("{}[{}]", path, i);
                check_value(items, constraints, element, &element_path, violations);
            }
            if constraints.unique_items {
                check_unique_items(elements, path, violations);
            }
        }
        (FieldType::String, Value::String(s)) => check_string(constraints, s, path, violations),
        (FieldType::Integer, Value::Int(_))
        | (FieldType::Decimal, Value::Int(_) | Value::Decimal(_)) => {
            if let Some(n) = value.as_f64() {
                check_range(constraints, n, path, violations);
            }
        }
        (FieldType::Boolean, Value::Bool(_))
        | (FieldType::Date, Value::Date(_))
        | (FieldType::ObjectId, Value::ObjectId(_)) => {}
        (expected, actual) => violations.push(Violation::type_mismatch(
            path,
            expected.to_string(),
            actual.type_name(),
        )),
    }
}

fn check_string(constraints: &Constraints, s: &str, path: &str, violations: &mut Vec<Violation>) {
    let len = s.chars().count();

    if let Some(min) = constraints.min_length {
        if len < min {
            violations.push(Violation::constraint(
                path,
                ConstraintKind::Length,
                format!("length {} is below minLength {}", len, min),
            ));
        }
    }
    if let Some(max) = constraints.max_length {
        if len > max {
            violations.push(Violation::constraint(
                path,
                ConstraintKind::Length,
                format!("length {} exceeds maxLength {}", len, max),
            ));
        }
    }
    if let Some(pattern) = &constraints.pattern {
        if !pattern.is_full_match(s) {
            violations.push(Violation::constraint(
                path,
                ConstraintKind::Pattern,
                format!("does not match pattern '{}'", pattern.as_str()),
            ));
        }
    }
    if let Some(allowed) = &constraints.enum_values {
        if !allowed.iter().any(|a| a == s) {
            violations.push(Violation::constraint(
                path,
                ConstraintKind::EnumMembership,
                format!("'{}' is not one of [{}]", s, allowed.join(", ")),
            ));
        }
    }
}

/// Reports every element equal to an earlier one, at its own index.
fn check_unique_items(elements: &[Value], path: &str, violations: &mut Vec<Violation>) {
    for (i, element) in elements.iter().enumerate() {
        if let Some(first) = elements[..i].iter().position(|e| e == element) {
            violations.push(Violation::constraint(
                format!("{}[{}]", path, i),
                ConstraintKind::UniqueItems,
                format!("duplicates element {}", first),
            ));
        }
    }
}

fn check_range(constraints: &Constraints, n: f64, path: &str, violations: &mut Vec<Violation>) {
    if let Some(min) = constraints.minimum {
        if n < min {
            violations.push(Violation::constraint(
                path,
                ConstraintKind::Range,
                format!("{} is below minimum {}", n, min),
            ));
        }
    }
    if let Some(max) = constraints.maximum {
        if n > max {
            violations.push(Violation::constraint(
                path,
                ConstraintKind::Range,
                format!("{} exceeds maximum {}", n, max),
            ));
        }
    }
}
