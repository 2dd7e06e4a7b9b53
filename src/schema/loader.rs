//! Schema files
//!
//! A schema file is a JSON array of definitions, the serialized form of
//! `SchemaDefinition`. Loading registers every definition and freezes the
//! registry; unreadable or malformed files abort startup.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::observability::{log_event_with_fields, Event};

use super::errors::{SchemaError, SchemaResult};
use super::registry::SchemaRegistry;
use super::types::SchemaDefinition;

/// Reads and writes schema definition files.
pub struct SchemaLoader;

impl SchemaLoader {
    /// Loads a frozen registry from a schema file.
    pub fn load_file(path: &Path) -> SchemaResult<SchemaRegistry> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|e| SchemaError::malformed(&display, format!("Failed to read file: {}", e)))?;

        let registry = Self::load_str(&content).map_err(|e| match e {
            SchemaError::MalformedSchemaFile { reason, .. } => {
                SchemaError::malformed(&display, reason)
            }
            other => other,
        })?;

        let count = registry.len().to_string();
        log_event_with_fields(
            Event::SchemaFileLoaded,
            &[("path", display.as_str()), ("kinds", count.as_str())],
        );
        Ok(registry)
    }

    /// Parses definitions from JSON text and builds a frozen registry.
    pub fn load_str(content: &str) -> SchemaResult<SchemaRegistry> {
        let definitions: Vec<SchemaDefinition> = serde_json::from_str(content)
            .map_err(|e| SchemaError::malformed("<in-memory>", format!("Invalid JSON: {}", e)))?;

        let mut registry = SchemaRegistry::new();
        for definition in definitions {
            registry.register(definition)?;
        }
        registry.freeze()?;
        Ok(registry)
    }

    /// Serializes a registry's definitions, in declaration order.
    pub fn to_json(registry: &SchemaRegistry) -> SchemaResult<String> {
        let definitions: Vec<&SchemaDefinition> = registry.definitions().collect();
        serde_json::to_string_pretty(&definitions).map_err(|e| {
            SchemaError::write_failed("<in-memory>", format!("Failed to serialize schema: {}", e))
        })
    }

    /// Writes a registry's definitions to a new file at `path`. Existing
    /// files are never overwritten.
    pub fn save_file(registry: &SchemaRegistry, path: &Path) -> SchemaResult<()> {
        let display = path.display().to_string();
        let content = Self::to_json(registry)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| {
                let reason = match e.kind() {
                    io::ErrorKind::AlreadyExists => "File already exists".to_string(),
                    _ => format!("Failed to create file: {}", e),
                };
                SchemaError::write_failed(&display, reason)
            })?;

        file.write_all(content.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| {
                SchemaError::write_failed(&display, format!("Failed to write file: {}", e))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::catalog;
    use crate::schema::EntityKind;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("schemas.json");

        let registry = catalog::build().unwrap();
        SchemaLoader::save_file(&registry, &path).unwrap();

        let loaded = SchemaLoader::load_file(&path).unwrap();
        assert!(loaded.is_frozen());
        assert!(loaded.is_complete());
        assert_eq!(
            loaded.get(EntityKind::Review).unwrap(),
            registry.get(EntityKind::Review).unwrap()
        );
    }

    #[test]
    fn test_save_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("schemas.json");
        let registry = catalog::build().unwrap();

        fs::write(&path, "[]").unwrap();
        let err = SchemaLoader::save_file(&registry, &path).unwrap_err();
        assert_eq!(err.code(), "RATO_SCHEMA_FILE_WRITE");
        assert!(err.to_string().contains("File already exists"));
        assert!(!err.is_fatal());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_save_into_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent").join("schemas.json");
        let registry = catalog::build().unwrap();

        let err = SchemaLoader::save_file(&registry, &path).unwrap_err();
        assert!(matches!(err, SchemaError::SchemaFileWrite { .. }));
        assert!(err.to_string().contains("Failed to create file"));
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = SchemaLoader::load_file(&temp_dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn test_malformed_json_names_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "[{\"kind\": ").unwrap();

        let err = SchemaLoader::load_file(&path).unwrap_err();
        assert_eq!(err.code(), "RATO_MALFORMED_SCHEMA_FILE");
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let json = r#"[{"kind": "generos", "fields": [
            {"name": "nome", "type": "string", "required": true,
             "constraints": {"pattern": "(unclosed"}}
        ]}]"#;
        assert!(SchemaLoader::load_str(json).is_err());
    }

    #[test]
    fn test_partial_schema_with_dangling_target() {
        let json = r#"[{"kind": "avaliacoes", "fields": [
            {"name": "id_colecao", "type": "objectId", "required": true,
             "reference": {"kind": "colecoes"}}
        ]}]"#;
        let err = SchemaLoader::load_str(json).unwrap_err();
        assert_eq!(err.code(), "RATO_INVALID_DEFINITION");
    }

    #[test]
    fn test_partial_schema_loads() {
        let json = r#"[{"kind": "generos", "fields": [
            {"name": "nome", "type": "string", "required": true, "unique": true},
            {"name": "surgiu_em", "type": "date", "required": true}
        ]}]"#;
        let registry = SchemaLoader::load_str(json).unwrap();
        assert_eq!(registry.kinds(), vec![EntityKind::Genre]);
    }
}
