//! Violation reports

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::EntityKind;

use super::references::RecordKey;

/// Which constraint family a value broke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    Length,
    Pattern,
    Range,
    EnumMembership,
    /// Array element repeats an earlier one
    UniqueItems,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::Length => write!(f, "Length"),
            ConstraintKind::Pattern => write!(f, "Pattern"),
            ConstraintKind::Range => write!(f, "Range"),
            ConstraintKind::EnumMembership => write!(f, "EnumMembership"),
            ConstraintKind::UniqueItems => write!(f, "UniqueItems"),
        }
    }
}

/// The rule a violation broke
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule")]
pub enum ViolationKind {
    MissingField,
    TypeMismatch {
        expected: String,
        actual: String,
    },
    ConstraintViolation {
        constraint: ConstraintKind,
    },
    DanglingReference {
        target: EntityKind,
        key: RecordKey,
    },
    /// Value already held by another document of the same kind
    DuplicateValue,
    /// Undeclared field under strict field policy
    UnexpectedField,
}

impl ViolationKind {
    /// Stable short name, e.g. `ConstraintViolation(Length)`
    pub fn name(&self) -> String {
        match self {
            ViolationKind::MissingField => "MissingField".into(),
            ViolationKind::TypeMismatch { .. } => "TypeMismatch".into(),
            ViolationKind::ConstraintViolation { constraint } => {
                format!("ConstraintViolation({})", constraint)
            }
            ViolationKind::DanglingReference { .. } => "DanglingReference".into(),
            ViolationKind::DuplicateValue => "DuplicateValue".into(),
            ViolationKind::UnexpectedField => "UnexpectedField".into(),
        }
    }
}

/// A single reason a document fails validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Field path; array elements are index-qualified, e.g. `email[1]`
    pub field: String,
    #[serde(flatten)]
    pub kind: ViolationKind,
    pub detail: String,
}

impl Violation {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: ViolationKind::MissingField,
            detail: "required field is absent".into(),
        }
    }

    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        let expected = expected.into();
        let actual = actual.into();
        Self {
            field: field.into(),
            detail: format!("expected {}, got {}", expected, actual),
            kind: ViolationKind::TypeMismatch { expected, actual },
        }
    }

    pub fn constraint(
        field: impl Into<String>,
        constraint: ConstraintKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            kind: ViolationKind::ConstraintViolation { constraint },
            detail: detail.into(),
        }
    }

    pub fn dangling_reference(
        field: impl Into<String>,
        target: EntityKind,
        key: RecordKey,
    ) -> Self {
        Self {
            field: field.into(),
            detail: format!("no {} with {}", target, key),
            kind: ViolationKind::DanglingReference { target, key },
        }
    }

    pub fn duplicate_value(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: ViolationKind::DuplicateValue,
            detail: detail.into(),
        }
    }

    pub fn unexpected_field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: ViolationKind::UnexpectedField,
            detail: "field is not declared".into(),
        }
    }

    /// Constraint family, for constraint violations
    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        match self.kind {
            ViolationKind::ConstraintViolation { constraint } => Some(constraint),
            _ => None,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}': {}: {}", self.field, self.kind.name(), self.detail)
    }
}

/// Outcome of validating one document. Never fail-fast: `violations` holds
/// every problem found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Appends violations from a later phase.
    pub fn merge(&mut self, more: Vec<Violation>) {
        self.violations.extend(more);
        self.valid = self.violations.is_empty();
    }

    /// Violations reported on exactly `field`
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations.iter().filter(move |v| v.field == field)
    }

    pub fn has_constraint(&self, field: &str, constraint: ConstraintKind) -> bool {
        self.for_field(field)
            .any(|v| v.constraint_kind() == Some(constraint))
    }

    pub fn missing_fields(&self) -> impl Iterator<Item = &str> {
        self.violations
            .iter()
            .filter(|v| v.kind == ViolationKind::MissingField)
            .map(|v| v.field.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ObjectId;

    #[test]
    fn test_empty_result_is_valid() {
        let result = ValidationResult::from_violations(vec![]);
        assert!(result.is_valid());
    }

    #[test]
    fn test_merge_invalidates() {
        let mut result = ValidationResult::from_violations(vec![]);
        result.merge(vec![Violation::missing_field("nota")]);
        assert!(!result.is_valid());
        assert_eq!(result.missing_fields().collect::<Vec<_>>(), vec!["nota"]);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(
            Violation::constraint("senha", ConstraintKind::Length, "too short")
                .kind
                .name(),
            "ConstraintViolation(Length)"
        );
        assert_eq!(Violation::missing_field("x").kind.name(), "MissingField");
    }

    #[test]
    fn test_type_mismatch_detail() {
        let v = Violation::type_mismatch("duracao", "integer", "string");
        assert_eq!(v.detail, "expected integer, got string");
        assert!(v.to_string().contains("duracao"));
    }

    #[test]
    fn test_serialized_shape() {
        let id = ObjectId::from_bytes([0xab; 12]);
        let v =
            Violation::dangling_reference("id_colecao", EntityKind::Collection, RecordKey::Id(id));
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["field"], "id_colecao");
        assert_eq!(json["rule"], "DanglingReference");
        assert_eq!(json["target"], "colecoes");

        let c = Violation::constraint("nota", ConstraintKind::Range, "above maximum 10");
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["rule"], "ConstraintViolation");
        assert_eq!(json["constraint"], "Range");
    }
}
