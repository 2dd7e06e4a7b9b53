//! Typed document values and Extended JSON decoding

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde_json::{json, Map, Value as Json};

use super::errors::{DocumentError, DocumentResult};
use super::object_id::ObjectId;

/// A single typed document value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(f64),
    String(String),
    Date(DateTime<Utc>),
    ObjectId(ObjectId),
    Array(Vec<Value>),
    /// Embedded document
    Object(Document),
}

impl Value {
    /// Decodes a relaxed Extended JSON value.
    pub fn from_json(json: &Json) -> DocumentResult<Self> {
        Ok(match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                // u64 beyond i64 and fractional numbers both land here
                None => Value::Decimal(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::Array(
                items
                    .iter()
                    .map(Value::from_json)
                    .collect::<DocumentResult<Vec<_>>>()?,
            ),
            Json::Object(map) => match extended_tag(map) {
                Some((tag, payload)) => decode_extended(tag, payload)?,
                None => Value::Object(Document::from_map(map)?),
            },
        })
    }

    /// Encodes back to relaxed Extended JSON.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => json!(i),
            Value::Decimal(d) => json!({ "$numberDecimal": d.to_string() }),
            Value::String(s) => Json::String(s.clone()),
            Value::Date(d) => json!({ "$date": d.to_rfc3339_opts(SecondsFormat::Millis, true) }),
            Value::ObjectId(id) => json!({ "$oid": id.to_hex() }),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(doc) => doc.to_json(),
        }
    }

    /// Returns the schema-level type name, used in `TypeMismatch` reports
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::ObjectId(_) => "objectId",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object_id(&self) -> Option<&ObjectId> {
        match self {
            Value::ObjectId(id) => Some(id),
            _ => None,
        }
    }

    /// Numeric view for range checks; integers widen to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

#[derive(Clone, Copy)]
enum ExtendedTag {
    Oid,
    Date,
    NumberDecimal,
    NumberInt,
    NumberLong,
}

/// Single-key objects whose key is a known Extended JSON tag
fn extended_tag(map: &Map<String, Json>) -> Option<(ExtendedTag, &Json)> {
    if map.len() != 1 {
        return None;
    }
    let (key, payload) = map.iter().next()?;
    let tag = match key.as_str() {
        "$oid" => ExtendedTag::Oid,
        "$date" => ExtendedTag::Date,
        "$numberDecimal" => ExtendedTag::NumberDecimal,
        "$numberInt" => ExtendedTag::NumberInt,
        "$numberLong" => ExtendedTag::NumberLong,
        _ => return None,
    };
    Some((tag, payload))
}

fn decode_extended(tag: ExtendedTag, payload: &Json) -> DocumentResult<Value> {
    match tag {
        ExtendedTag::Oid => {
            let text = payload
                .as_str()
                .ok_or_else(|| DocumentError::InvalidObjectId(payload.to_string()))?;
            Ok(Value::ObjectId(ObjectId::parse_str(text)?))
        }
        ExtendedTag::Date => decode_date(payload).map(Value::Date),
        ExtendedTag::NumberDecimal => {
            let text = number_text(payload);
            text.trim()
                .parse::<f64>()
                .ok()
                .filter(|d| d.is_finite())
                .map(Value::Decimal)
                .ok_or(DocumentError::InvalidNumber {
                    tag: "$numberDecimal",
                    text,
                })
        }
        // $numberInt is 32-bit, widened on decode
        ExtendedTag::NumberInt => {
            let text = number_text(payload);
            text.trim()
                .parse::<i32>()
                .map(|n| Value::Int(i64::from(n)))
                .map_err(|_| DocumentError::InvalidNumber {
                    tag: "$numberInt",
                    text,
                })
        }
        ExtendedTag::NumberLong => {
            let text = number_text(payload);
            text.trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| DocumentError::InvalidNumber {
                    tag: "$numberLong",
                    text,
                })
        }
    }
}

fn number_text(payload: &Json) -> String {
    match payload {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Accepts RFC 3339, a bare `YYYY-MM-DD`, epoch millis, or canonical
/// `{"$numberLong": "<millis>"}`.
fn decode_date(payload: &Json) -> DocumentResult<DateTime<Utc>> {
    match payload {
        Json::String(text) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                return Ok(dt.with_timezone(&Utc));
            }
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| Utc.from_utc_datetime(&naive))
                .ok_or_else(|| DocumentError::InvalidDate(text.clone()))
        }
        Json::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .ok_or_else(|| DocumentError::InvalidDate(n.to_string())),
        Json::Object(map) => match map.get("$numberLong").and_then(Json::as_str) {
            Some(text) if map.len() == 1 => text
                .parse::<i64>()
                .ok()
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
                .ok_or_else(|| DocumentError::InvalidDate(text.to_string())),
            _ => Err(DocumentError::InvalidDate(payload.to_string())),
        },
        other => Err(DocumentError::InvalidDate(other.to_string())),
    }
}

/// A candidate document: field name -> value, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: BTreeMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a top-level JSON object.
    pub fn from_json(json: &Json) -> DocumentResult<Self> {
        match json {
            Json::Object(map) => Self::from_map(map),
            other => Err(DocumentError::NotAnObject(json_kind(other))),
        }
    }

    fn from_map(map: &Map<String, Json>) -> DocumentResult<Self> {
        let mut fields = BTreeMap::new();
        for (key, value) in map {
            fields.insert(key.clone(), Value::from_json(value)?);
        }
        Ok(Self { fields })
    }

    pub fn to_json(&self) -> Json {
        Json::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.insert(field, value);
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The document's own `_id`, when it carries an objectId one
    pub fn id(&self) -> Option<&ObjectId> {
        self.get("_id").and_then(Value::as_object_id)
    }
}

pub(crate) fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
