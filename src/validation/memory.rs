//! In-memory lookup
//!
//! Answers existence and uniqueness queries from documents held in memory.
//! Backs the command line and tests; a real deployment supplies its own
//! `ReferenceLookup` over the document store.

use std::collections::HashMap;

use serde_json::Value as Json;

use crate::document::{json_kind, Document, DocumentError, DocumentResult, ObjectId, Value};
use crate::schema::EntityKind;

use super::errors::ValidationOutcome;
use super::references::{LookupError, RecordKey, ReferenceLookup};

#[derive(Debug, Clone, Default)]
pub struct MemoryLookup {
    records: HashMap<EntityKind, Vec<Document>>,
}

impl MemoryLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a lookup from fixtures shaped `{"<collection>": [<document>, ...]}`.
    pub fn from_fixtures(fixtures: &Json) -> ValidationOutcome<Self> {
        let collections = fixtures
            .as_object()
            .ok_or(DocumentError::NotAnObject(json_kind(fixtures)))?;

        let mut lookup = Self::new();
        for (name, documents) in collections {
            let kind: EntityKind = name.parse()?;
            for document in documents.as_array().into_iter().flatten() {
                lookup.insert_json(kind, document)?;
            }
        }
        Ok(lookup)
    }

    pub fn insert(&mut self, kind: EntityKind, document: Document) {
        self.records.entry(kind).or_default().push(document);
    }

    pub fn insert_json(&mut self, kind: EntityKind, document: &Json) -> DocumentResult<()> {
        self.insert(kind, Document::from_json(document)?);
        Ok(())
    }

    /// Number of records held for `kind`
    pub fn count(&self, kind: EntityKind) -> usize {
        self.records.get(&kind).map_or(0, Vec::len)
    }

    fn records(&self, kind: EntityKind) -> &[Document] {
        self.records.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl ReferenceLookup for MemoryLookup {
    fn exists(&self, kind: EntityKind, key: &RecordKey) -> Result<bool, LookupError> {
        let found = match key {
            RecordKey::Id(id) => self.records(kind).iter().any(|d| d.id() == Some(id)),
            RecordKey::Natural { field, value } => self
                .records(kind)
                .iter()
                .any(|d| d.get(field).and_then(Value::as_str) == Some(value.as_str())),
        };
        Ok(found)
    }

    fn value_in_use(
        &self,
        kind: EntityKind,
        field: &str,
        value: &Value,
        exclude: Option<&ObjectId>,
    ) -> Result<bool, LookupError> {
        Ok(self.records(kind).iter().any(|d| {
            let is_self = exclude.is_some() && d.id() == exclude;
            !is_self && d.get(field) == Some(value)
        }))
    }
}
