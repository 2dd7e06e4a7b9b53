//! Schema type definitions
//!
//! Supported field types:
//! - string: UTF-8 string
//! - integer: 64-bit signed integer
//! - decimal: decimal number (integers accepted)
//! - boolean
//! - date
//! - objectId: 12-byte document identifier
//! - array: homogeneous array with element type
//!
//! Constraints on an array field apply to each of its elements, except
//! `uniqueItems`, which applies to the array as a whole.

use std::collections::HashSet;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::entity::EntityKind;
use super::errors::{SchemaError, SchemaResult};

/// Declared field types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldType {
    String,
    Integer,
    Decimal,
    Boolean,
    Date,
    ObjectId,
    /// Homogeneous array with single element type
    Array {
        /// Element type (boxed to allow recursive types)
        items: Box<FieldType>,
    },
}

impl FieldType {
    /// Shorthand for `Array { items }`
    pub fn array_of(items: FieldType) -> Self {
        FieldType::Array {
            items: Box::new(items),
        }
    }

    /// Innermost non-array type
    pub fn element_type(&self) -> &FieldType {
        match self {
            FieldType::Array { items } => items.element_type(),
            other => other,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, FieldType::Array { .. })
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Decimal)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Decimal => write!(f, "decimal"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::Date => write!(f, "date"),
            FieldType::ObjectId => write!(f, "objectId"),
            FieldType::Array { items } => write!(f, "array<{}>", items),
        }
    }
}

/// A regular expression matched against the whole string.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles `source` anchored at both ends.
    pub fn new(source: impl Into<String>) -> Result<Self, regex::Error> {
        let source = source.into();
        let regex = Regex::new(&format!("^(?:{})$", source))?;
        Ok(Self { source, regex })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_full_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(source).map_err(serde::de::Error::custom)
    }
}

/// Field-level constraints. Bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    /// No two elements of an array field may be equal
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unique_items: bool,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        !self.has_string_constraints() && !self.has_range() && !self.unique_items
    }

    /// Length, pattern or enum constraints present
    pub fn has_string_constraints(&self) -> bool {
        self.min_length.is_some()
            || self.max_length.is_some()
            || self.enum_values.is_some()
            || self.pattern.is_some()
    }

    pub fn has_range(&self) -> bool {
        self.minimum.is_some() || self.maximum.is_some()
    }
}

/// Target of a reference field.
///
/// Without `key_field` the value is the target's `_id` (an objectId). With
/// it, the value is a string matched against that field of the target, e.g.
/// `nome_genero` against `Genre.nome`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceTarget {
    pub kind: EntityKind,
    #[serde(default, rename = "by", skip_serializing_if = "Option::is_none")]
    pub key_field: Option<String>,
}

impl ReferenceTarget {
    pub fn by_id(kind: EntityKind) -> Self {
        Self {
            kind,
            key_field: None,
        }
    }

    pub fn by_key(kind: EntityKind, field: impl Into<String>) -> Self {
        Self {
            kind,
            key_field: Some(field.into()),
        }
    }

    pub fn is_natural_key(&self) -> bool {
        self.key_field.is_some()
    }
}

/// A single field rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    pub name: String,
    /// Field data type
    #[serde(flatten)]
    pub field_type: FieldType,
    /// Whether field must be present
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Constraints::is_empty")]
    pub constraints: Constraints,
    /// Value must not be held by another document of the same kind
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceTarget>,
}

impl FieldRule {
    fn new(name: impl Into<String>, field_type: FieldType, required: bool) -> Self {
        Self {
            name: name.into(),
            field_type,
            required,
            constraints: Constraints::default(),
            unique: false,
            reference: None,
        }
    }

    /// Create a required field
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self::new(name, field_type, true)
    }

    /// Create an optional field
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self::new(name, field_type, false)
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.constraints.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.constraints.max_length = Some(max);
        self
    }

    pub fn minimum(mut self, min: f64) -> Self {
        self.constraints.minimum = Some(min);
        self
    }

    pub fn maximum(mut self, max: f64) -> Self {
        self.constraints.maximum = Some(max);
        self
    }

    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.constraints.enum_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.constraints.pattern = Some(pattern);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Array elements must be pairwise distinct
    pub fn unique_items(mut self) -> Self {
        self.constraints.unique_items = true;
        self
    }

    /// Reference by `_id`
    pub fn references(mut self, kind: EntityKind) -> Self {
        self.reference = Some(ReferenceTarget::by_id(kind));
        self
    }

    /// Reference by a natural key of the target
    pub fn references_by(mut self, kind: EntityKind, field: impl Into<String>) -> Self {
        self.reference = Some(ReferenceTarget::by_key(kind, field));
        self
    }

    /// Checks the rule on its own; `kind` is only used for the error.
    fn validate_structure(&self, kind: EntityKind) -> SchemaResult<()> {
        let c = &self.constraints;
        let element = self.field_type.element_type();
        let fail = |reason: String| Err(SchemaError::invalid(kind, reason));

        if self.name.is_empty() {
            return fail("field name must not be empty".into());
        }
        if c.has_string_constraints() && *element != FieldType::String {
            return fail(format!(
                "field '{}': length, pattern and enum constraints need a string type, got {}",
                self.name, self.field_type
            ));
        }
        if c.has_range() && !element.is_numeric() {
            return fail(format!(
                "field '{}': range constraints need a numeric type, got {}",
                self.name, self.field_type
            ));
        }
        if c.unique_items && !self.field_type.is_array() {
            return fail(format!(
                "field '{}': uniqueItems needs an array type, got {}",
                self.name, self.field_type
            ));
        }
        if let (Some(min), Some(max)) = (c.min_length, c.max_length) {
            if min > max {
                return fail(format!(
                    "field '{}': minLength {} exceeds maxLength {}",
                    self.name, min, max
                ));
            }
        }
        for bound in [c.minimum, c.maximum].into_iter().flatten() {
            if !bound.is_finite() {
                return fail(format!("field '{}': range bounds must be finite", self.name));
            }
        }
        if let (Some(min), Some(max)) = (c.minimum, c.maximum) {
            if min > max {
                return fail(format!(
                    "field '{}': minimum {} exceeds maximum {}",
                    self.name, min, max
                ));
            }
        }
        if let Some(values) = &c.enum_values {
            if values.is_empty() {
                return fail(format!("field '{}': enum must not be empty", self.name));
            }
        }
        if let Some(target) = &self.reference {
            let expected = if target.is_natural_key() {
                FieldType::String
            } else {
                FieldType::ObjectId
            };
            if *element != expected {
                return fail(format!(
                    "field '{}': reference to {} needs {} values, got {}",
                    self.name, target.kind, expected, self.field_type
                ));
            }
        }

        Ok(())
    }
}

/// Complete definition for one entity kind. Field order is preserved and
/// drives violation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub kind: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldRule>,
}

impl SchemaDefinition {
    pub fn new(kind: EntityKind, fields: Vec<FieldRule>) -> Self {
        Self {
            kind,
            description: None,
            fields,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
    }

    /// Fields carrying a reference target
    pub fn references(&self) -> impl Iterator<Item = (&FieldRule, &ReferenceTarget)> {
        self.fields
            .iter()
            .filter_map(|f| f.reference.as_ref().map(|target| (f, target)))
    }

    pub fn unique_fields(&self) -> impl Iterator<Item = &FieldRule> {
        self.fields.iter().filter(|f| f.unique)
    }

    /// Validates the definition itself (not a document). Cross-kind checks
    /// happen when the registry is frozen.
    pub fn validate_structure(&self) -> SchemaResult<()> {
        let mut seen = HashSet::new();
        for rule in &self.fields {
            if !seen.insert(rule.name.as_str()) {
                return Err(SchemaError::invalid(
                    self.kind,
                    format!("field '{}' declared more than once", rule.name),
                ));
            }
            rule.validate_structure(self.kind)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review() -> SchemaDefinition {
        SchemaDefinition::new(
            EntityKind::Review,
            vec![
                FieldRule::required("id_colecao", FieldType::ObjectId)
                    .references(EntityKind::Collection),
                FieldRule::required("nota", FieldType::Decimal)
                    .minimum(0.0)
                    .maximum(10.0),
                FieldRule::optional("titulo", FieldType::String).max_length(60),
            ],
        )
    }

    #[test]
    fn test_definition_structure_valid() {
        assert!(review().validate_structure().is_ok());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let mut def = review();
        def.fields.push(FieldRule::optional("nota", FieldType::Integer));
        let err = def.validate_structure().unwrap_err();
        assert_eq!(err.code(), "RATO_INVALID_DEFINITION");
        assert!(err.to_string().contains("nota"));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let def = SchemaDefinition::new(
            EntityKind::Review,
            vec![FieldRule::required("nota", FieldType::Decimal)
                .minimum(10.0)
                .maximum(0.0)],
        );
        assert!(def.validate_structure().is_err());
    }

    #[test]
    fn test_inverted_length_rejected() {
        let def = SchemaDefinition::new(
            EntityKind::Listener,
            vec![FieldRule::required("username", FieldType::String)
                .min_length(30)
                .max_length(3)],
        );
        assert!(def.validate_structure().is_err());
    }

    #[test]
    fn test_empty_enum_rejected() {
        let def = SchemaDefinition::new(
            EntityKind::Listener,
            vec![FieldRule::optional("sexo", FieldType::String).one_of(&[])],
        );
        assert!(def.validate_structure().is_err());
    }

    #[test]
    fn test_constraint_on_wrong_type_rejected() {
        let def = SchemaDefinition::new(
            EntityKind::Event,
            vec![FieldRule::required("capacidade", FieldType::Integer).max_length(3)],
        );
        assert!(def.validate_structure().is_err());

        let def = SchemaDefinition::new(
            EntityKind::Event,
            vec![FieldRule::required("nome", FieldType::String).minimum(1.0)],
        );
        assert!(def.validate_structure().is_err());
    }

    #[test]
    fn test_reference_type_checked() {
        let def = SchemaDefinition::new(
            EntityKind::Featuring,
            vec![FieldRule::required("id_usuario", FieldType::String)
                .references(EntityKind::ArtistBand)],
        );
        assert!(def.validate_structure().is_err());

        let def = SchemaDefinition::new(
            EntityKind::GenreSongLink,
            vec![FieldRule::required("nome_genero", FieldType::String)
                .references_by(EntityKind::Genre, "nome")],
        );
        assert!(def.validate_structure().is_ok());
    }

    #[test]
    fn test_array_constraints_apply_to_elements() {
        let def = SchemaDefinition::new(
            EntityKind::Listener,
            vec![FieldRule::required("email", FieldType::array_of(FieldType::String))
                .pattern(Pattern::new(".+@.+\\..+").unwrap())],
        );
        assert!(def.validate_structure().is_ok());
    }

    #[test]
    fn test_unique_items_needs_array() {
        let def = SchemaDefinition::new(
            EntityKind::Collection,
            vec![FieldRule::required("titulo", FieldType::String).unique_items()],
        );
        let err = def.validate_structure().unwrap_err();
        assert!(err.to_string().contains("uniqueItems"));

        let def = SchemaDefinition::new(
            EntityKind::Collection,
            vec![FieldRule::optional("generos_ids", FieldType::array_of(FieldType::ObjectId))
                .unique_items()],
        );
        assert!(def.validate_structure().is_ok());
    }

    #[test]
    fn test_pattern_is_full_match() {
        let p = Pattern::new("[a-z]+").unwrap();
        assert!(p.is_full_match("abc"));
        assert!(!p.is_full_match("abc1"));
        assert!(!p.is_full_match("1abc"));
    }

    #[test]
    fn test_pattern_compile_error() {
        assert!(Pattern::new("(unclosed").is_err());
    }

    #[test]
    fn test_field_type_display() {
        assert_eq!(FieldType::ObjectId.to_string(), "objectId");
        assert_eq!(
            FieldType::array_of(FieldType::String).to_string(),
            "array<string>"
        );
    }

    #[test]
    fn test_required_fields_in_order() {
        let def = review();
        let required: Vec<_> = def.required_fields().collect();
        assert_eq!(required, vec!["id_colecao", "nota"]);
    }

    #[test]
    fn test_definition_serde_roundtrip() {
        let def = review();
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["kind"], "avaliacoes");
        assert_eq!(json["fields"][0]["type"], "objectId");
        assert_eq!(json["fields"][0]["reference"]["kind"], "colecoes");
        assert_eq!(json["fields"][1]["constraints"]["maximum"], 10.0);

        let back: SchemaDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(back, def);
    }

    #[test]
    fn test_array_field_serde() {
        let rule = FieldRule::optional("generos_ids", FieldType::array_of(FieldType::ObjectId))
            .unique_items()
            .references(EntityKind::Genre);
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["type"], "array");
        assert_eq!(json["items"]["type"], "objectId");
        assert_eq!(json["constraints"]["uniqueItems"], true);
        let back: FieldRule = serde_json::from_value(json).unwrap();
        assert_eq!(back, rule);
    }
}
