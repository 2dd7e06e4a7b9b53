//! Document value model
//!
//! Candidate documents arrive as JSON in MongoDB Extended JSON (relaxed)
//! form. This module turns them into typed values so the validator can tell
//! an objectId from a string and a date from a number:
//!
//! - `{"$oid": "..."}` -> objectId
//! - `{"$date": ...}` -> date
//! - `{"$numberDecimal": "..."}` -> decimal
//! - `{"$numberInt": "..."}` / `{"$numberLong": "..."}` -> integer
//!
//! Malformed extended payloads are a `DocumentError`: the input could not be
//! read at all, which is different from a document that violates its schema.

mod errors;
mod object_id;
mod value;

pub use errors::{DocumentError, DocumentResult};
pub use object_id::ObjectId;
pub use value::{Document, Value};
pub(crate) use value::json_kind;
