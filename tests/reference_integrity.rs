//! Referential Integrity Tests
//!
//! - Dangling references invalidate a document without raising an error
//! - Natural-key references resolve through the target's name field
//! - Unique fields reject values held by other records
//! - Lookup failures surface as errors, never as verdicts

use rato_schema::document::{Document, ObjectId};
use rato_schema::schema::{catalog, EntityKind};
use rato_schema::validation::{
    validate_document, ConstraintKind, DocumentValidator, LookupError, MemoryLookup, RecordKey,
    ReferenceLookup, ValidationError, ValidationResult, ViolationKind,
};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

const LISTENER: &str = "65a1b2c3d4e5f60718293a4c";
const COLLECTION: &str = "65a1b2c3d4e5f60718293a4e";
const GENRE: &str = "65a1b2c3d4e5f60718293a4f";
const ARTIST: &str = "65a1b2c3d4e5f60718293a50";

fn store() -> MemoryLookup {
    MemoryLookup::from_fixtures(&json!({
        "ouvintes": [{ "_id": { "$oid": LISTENER } }],
        "colecoes": [{ "_id": { "$oid": COLLECTION }, "caminho_capa": "/capas/abbey.png" }],
        "generos": [{ "_id": { "$oid": GENRE }, "nome": "Rock" }],
        "artistas_bandas": [{ "_id": { "$oid": ARTIST } }],
        "produtos": [{ "nome": "Camiseta Turne" }],
        "eventos": [{ "nome": "Rato Fest" }]
    }))
    .unwrap()
}

fn review(collection: &str) -> Value {
    json!({
        "id_usuario": { "$oid": LISTENER },
        "id_colecao": { "$oid": collection },
        "nota": 8
    })
}

fn check(kind: EntityKind, json: Value, lookup: &MemoryLookup) -> ValidationResult {
    let registry = catalog::shared().unwrap();
    let document = Document::from_json(&json).unwrap();
    validate_document(registry, kind, &document, lookup).unwrap()
}

/// Lookup whose backing store is unreachable
struct Unreachable;

impl ReferenceLookup for Unreachable {
    fn exists(&self, _kind: EntityKind, _key: &RecordKey) -> Result<bool, LookupError> {
        Err(LookupError::Unavailable("store offline".into()))
    }
}

// =============================================================================
// Reference Tests
// =============================================================================

#[test]
fn test_review_with_existing_references_is_valid() {
    let result = check(EntityKind::Review, review(COLLECTION), &store());
    assert!(result.is_valid(), "{:?}", result.violations);
}

#[test]
fn test_review_with_dangling_collection_is_invalid() {
    let missing = "000000000000000000000bad";
    let result = check(EntityKind::Review, review(missing), &store());

    assert!(!result.is_valid());
    assert_eq!(result.violations.len(), 1);

    let violation = &result.violations[0];
    assert_eq!(violation.field, "id_colecao");
    assert_eq!(
        violation.kind,
        ViolationKind::DanglingReference {
            target: EntityKind::Collection,
            key: RecordKey::Id(missing.parse::<ObjectId>().unwrap()),
        }
    );
}

#[test]
fn test_ticket_resolves_names() {
    let ticket = json!({
        "nome_produto": "Camiseta Turne",
        "nome_evento": "Rato Fest",
        "tipo": "Pista"
    });
    assert!(check(EntityKind::Ticket, ticket, &store()).is_valid());

    let unknown_event = json!({
        "nome_produto": "Camiseta Turne",
        "nome_evento": "Festival Fantasma",
        "tipo": "Pista"
    });
    let result = check(EntityKind::Ticket, unknown_event, &store());
    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].field, "nome_evento");
    assert!(matches!(
        &result.violations[0].kind,
        ViolationKind::DanglingReference {
            target: EntityKind::Event,
            key: RecordKey::Natural { field, value },
        } if field == "nome" && value == "Festival Fantasma"
    ));
}

#[test]
fn test_genre_artist_link_uses_artist_id() {
    let link = json!({
        "nome_genero": "Rock",
        "id_artista_banda": { "$oid": ARTIST }
    });
    assert!(check(EntityKind::GenreArtistLink, link, &store()).is_valid());

    let as_string = json!({
        "nome_genero": "Rock",
        "id_artista_banda": ARTIST
    });
    let result = check(EntityKind::GenreArtistLink, as_string, &store());
    assert!(matches!(
        result.violations[0].kind,
        ViolationKind::TypeMismatch { .. }
    ));
}

#[test]
fn test_genre_linked_to_collection_once() {
    let collection = |genres: Value| {
        json!({
            "caminho_capa": "/capas/nova.png",
            "duracao": 2400,
            "data_lancamento": { "$date": "2024-05-10" },
            "titulo": "Nova",
            "tipo": "EP",
            "generos_ids": genres
        })
    };
    let genre = json!({ "$oid": GENRE });

    assert!(check(EntityKind::Collection, collection(json!([genre])), &store()).is_valid());

    let repeated = check(EntityKind::Collection, collection(json!([genre, genre])), &store());
    assert_eq!(repeated.violations.len(), 1);
    assert_eq!(repeated.violations[0].field, "generos_ids[1]");
    assert_eq!(
        repeated.violations[0].constraint_kind(),
        Some(ConstraintKind::UniqueItems)
    );
}

#[test]
fn test_field_violations_skip_reference_checks() {
    let mut doc = review("000000000000000000000bad");
    doc["nota"] = json!(42);

    let result = check(EntityKind::Review, doc, &store());
    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].field, "nota");
}

// =============================================================================
// Uniqueness Tests
// =============================================================================

#[test]
fn test_duplicate_genre_name_rejected() {
    let genre = json!({ "nome": "Rock", "surgiu_em": { "$date": "1950-01-01" } });
    let result = check(EntityKind::Genre, genre, &store());

    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].field, "nome");
    assert_eq!(result.violations[0].kind, ViolationKind::DuplicateValue);
}

#[test]
fn test_record_does_not_conflict_with_itself() {
    let genre = json!({
        "_id": { "$oid": GENRE },
        "nome": "Rock",
        "surgiu_em": { "$date": "1950-01-01" }
    });
    assert!(check(EntityKind::Genre, genre, &store()).is_valid());
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_lookup_failure_is_error_not_verdict() {
    let registry = catalog::shared().unwrap();
    let validator = DocumentValidator::new(registry).unwrap();

    let err = validator
        .validate_json(EntityKind::Review, &review(COLLECTION), &Unreachable)
        .unwrap_err();

    assert!(matches!(
        err,
        ValidationError::ReferenceCheckUnavailable { kind: EntityKind::Review, .. }
    ));
    assert_eq!(err.code(), "RATO_REFERENCE_CHECK_UNAVAILABLE");

    let snapshot = validator.metrics().snapshot();
    assert_eq!(snapshot.lookup_failures, 1);
    assert_eq!(snapshot.documents_validated, 0);
}
