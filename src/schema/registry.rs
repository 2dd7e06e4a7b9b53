//! The schema registry
//!
//! Definitions are registered once at startup, then the registry is frozen.
//! Freezing runs the cross-kind checks (reference targets must be
//! registered); after that the registry is read-only and can be shared by
//! any number of validating threads without locking.

use std::collections::HashMap;

use crate::observability::{log_event_with_fields, Event};

use super::entity::EntityKind;
use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldType, SchemaDefinition};

/// Per-kind schema definitions
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    definitions: HashMap<EntityKind, SchemaDefinition>,
    frozen: bool,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition under its kind.
    ///
    /// # Errors
    ///
    /// - `RegistryFrozen` once `freeze` has run
    /// - `DuplicateKind` if the kind already has a definition
    /// - `InvalidDefinition` if the definition is structurally invalid
    pub fn register(&mut self, definition: SchemaDefinition) -> SchemaResult<()> {
        if self.frozen {
            return Err(SchemaError::RegistryFrozen);
        }
        if self.definitions.contains_key(&definition.kind) {
            return Err(SchemaError::DuplicateKind(definition.kind));
        }

        definition.validate_structure()?;
        self.definitions.insert(definition.kind, definition);
        Ok(())
    }

    /// Finalizes the registry. Idempotent.
    ///
    /// Every reference target must be registered, and natural-key targets
    /// must name a string field of the target that is unique or required.
    pub fn freeze(&mut self) -> SchemaResult<()> {
        if self.frozen {
            return Ok(());
        }

        for kind in self.kinds() {
            let definition = &self.definitions[&kind];
            for (rule, target) in definition.references() {
                let target_def = self.definitions.get(&target.kind).ok_or_else(|| {
                    SchemaError::invalid(
                        kind,
                        format!(
                            "field '{}' references unregistered kind {}",
                            rule.name, target.kind
                        ),
                    )
                })?;

                if let Some(key_field) = &target.key_field {
                    let key_ok = target_def
                        .field(key_field)
                        .map_or(false, |f| {
                            f.field_type == FieldType::String && (f.unique || f.required)
                        });
                    if !key_ok {
                        return Err(SchemaError::invalid(
                            kind,
                            format!(
                                "field '{}' keys on {}.{}, which is not a unique or required \
                                 string field",
                                rule.name, target.kind, key_field
                            ),
                        ));
                    }
                }
            }
        }

        self.frozen = true;
        let count = self.definitions.len().to_string();
        log_event_with_fields(Event::RegistryFrozen, &[("kinds", count.as_str())]);
        Ok(())
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Gets the definition for a kind.
    pub fn get(&self, kind: EntityKind) -> SchemaResult<&SchemaDefinition> {
        self.definitions
            .get(&kind)
            .ok_or_else(|| SchemaError::UnknownKind(kind.to_string()))
    }

    /// Gets a definition by collection name or kind name.
    pub fn get_by_name(&self, name: &str) -> SchemaResult<&SchemaDefinition> {
        self.get(name.parse()?)
    }

    pub fn contains(&self, kind: EntityKind) -> bool {
        self.definitions.contains_key(&kind)
    }

    /// Registered kinds in declaration order
    pub fn kinds(&self) -> Vec<EntityKind> {
        EntityKind::ALL
            .into_iter()
            .filter(|k| self.definitions.contains_key(k))
            .collect()
    }

    /// Registered definitions in declaration order
    pub fn definitions(&self) -> impl Iterator<Item = &SchemaDefinition> {
        EntityKind::ALL
            .iter()
            .filter_map(move |k| self.definitions.get(k))
    }

    /// Kinds with no definition yet
    pub fn missing_kinds(&self) -> Vec<EntityKind> {
        EntityKind::ALL
            .into_iter()
            .filter(|k| !self.definitions.contains_key(k))
            .collect()
    }

    /// True when every kind has a definition
    pub fn is_complete(&self) -> bool {
        self.definitions.len() == EntityKind::ALL.len()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::FieldRule;

    fn genre() -> SchemaDefinition {
        SchemaDefinition::new(
            EntityKind::Genre,
            vec![
                FieldRule::required("nome", FieldType::String).unique(),
                FieldRule::required("surgiu_em", FieldType::Date),
            ],
        )
    }

    fn genre_song_link() -> SchemaDefinition {
        SchemaDefinition::new(
            EntityKind::GenreSongLink,
            vec![
                FieldRule::required("nome_genero", FieldType::String)
                    .references_by(EntityKind::Genre, "nome"),
                FieldRule::required("id_musica", FieldType::ObjectId)
                    .references(EntityKind::Song),
            ],
        )
    }

    fn song() -> SchemaDefinition {
        SchemaDefinition::new(
            EntityKind::Song,
            vec![FieldRule::required("titulo", FieldType::String)],
        )
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = SchemaRegistry::new();
        registry.register(genre()).unwrap();

        let def = registry.get(EntityKind::Genre).unwrap();
        assert_eq!(def.kind, EntityKind::Genre);
        assert!(registry.get_by_name("generos").is_ok());
    }

    #[test]
    fn test_duplicate_kind() {
        let mut registry = SchemaRegistry::new();
        registry.register(genre()).unwrap();

        let err = registry.register(genre()).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateKind(EntityKind::Genre));
    }

    #[test]
    fn test_unknown_kind() {
        let registry = SchemaRegistry::new();
        let err = registry.get(EntityKind::Song).unwrap_err();
        assert_eq!(err.code(), "RATO_UNKNOWN_KIND");
        assert!(registry.get_by_name("nonsense").is_err());
    }

    #[test]
    fn test_frozen_rejects_register() {
        let mut registry = SchemaRegistry::new();
        registry.register(genre()).unwrap();
        registry.freeze().unwrap();

        assert!(registry.is_frozen());
        assert_eq!(registry.register(song()).unwrap_err(), SchemaError::RegistryFrozen);
    }

    #[test]
    fn test_freeze_is_idempotent() {
        let mut registry = SchemaRegistry::new();
        registry.register(genre()).unwrap();
        registry.freeze().unwrap();
        assert!(registry.freeze().is_ok());
    }

    #[test]
    fn test_dangling_target_fails_at_freeze() {
        let mut registry = SchemaRegistry::new();
        registry.register(genre()).unwrap();
        // Song is never registered
        registry.register(genre_song_link()).unwrap();

        let err = registry.freeze().unwrap_err();
        assert_eq!(err.code(), "RATO_INVALID_DEFINITION");
        assert!(err.to_string().contains("id_musica"));
        assert!(!registry.is_frozen());
    }

    #[test]
    fn test_natural_key_must_exist_on_target() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(SchemaDefinition::new(
                EntityKind::Genre,
                vec![FieldRule::required("surgiu_em", FieldType::Date)],
            ))
            .unwrap();
        registry.register(song()).unwrap();
        registry.register(genre_song_link()).unwrap();

        let err = registry.freeze().unwrap_err();
        assert!(err.to_string().contains("Genre.nome"));
    }

    #[test]
    fn test_natural_key_must_identify_target() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(SchemaDefinition::new(
                EntityKind::Genre,
                vec![
                    FieldRule::required("surgiu_em", FieldType::Date),
                    FieldRule::optional("apelido", FieldType::String),
                ],
            ))
            .unwrap();
        registry.register(song()).unwrap();
        registry
            .register(SchemaDefinition::new(
                EntityKind::GenreSongLink,
                vec![FieldRule::required("nome_genero", FieldType::String)
                    .references_by(EntityKind::Genre, "apelido")],
            ))
            .unwrap();

        let err = registry.freeze().unwrap_err();
        assert_eq!(err.code(), "RATO_INVALID_DEFINITION");
        assert!(err.to_string().contains("Genre.apelido"));
        assert!(!registry.is_frozen());
    }

    #[test]
    fn test_required_string_key_accepted() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(SchemaDefinition::new(
                EntityKind::Genre,
                vec![FieldRule::required("nome", FieldType::String)],
            ))
            .unwrap();
        registry.register(song()).unwrap();
        registry.register(genre_song_link()).unwrap();

        assert!(registry.freeze().is_ok());
    }

    #[test]
    fn test_registration_order_does_not_matter() {
        let mut registry = SchemaRegistry::new();
        registry.register(genre_song_link()).unwrap();
        registry.register(song()).unwrap();
        registry.register(genre()).unwrap();

        assert!(registry.freeze().is_ok());
        assert_eq!(
            registry.kinds(),
            vec![EntityKind::Song, EntityKind::Genre, EntityKind::GenreSongLink]
        );
    }

    #[test]
    fn test_structural_error_surfaces_on_register() {
        let mut registry = SchemaRegistry::new();
        let bad = SchemaDefinition::new(
            EntityKind::Song,
            vec![
                FieldRule::required("titulo", FieldType::String),
                FieldRule::optional("titulo", FieldType::String),
            ],
        );
        assert!(registry.register(bad).is_err());
        assert!(!registry.contains(EntityKind::Song));
    }

    #[test]
    fn test_missing_kinds() {
        let mut registry = SchemaRegistry::new();
        registry.register(song()).unwrap();
        assert!(!registry.is_complete());
        assert_eq!(registry.missing_kinds().len(), 23);
    }
}
