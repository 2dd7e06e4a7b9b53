//! rato_schema - schema validation and referential integrity for the
//! music platform document store
//!
//! - `schema`: entity kinds, field rules, the frozen registry and catalog
//! - `document`: typed Extended JSON documents
//! - `validation`: field validation, reference checks, combined pipeline
//! - `observability`: structured logging and counters
//! - `cli`: the `rato-schema` command

pub mod cli;
pub mod document;
pub mod observability;
pub mod schema;
pub mod validation;
