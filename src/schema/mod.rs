//! Schema registry subsystem
//!
//! Holds, per entity kind, the ordered field rules, their type and range
//! constraints, and the reference targets of foreign-key fields.
//!
//! # Design Principles
//!
//! - One definition per entity kind
//! - Field names unique within a definition
//! - Reference targets registered before the registry is frozen
//! - Frozen registry is read-only and shared without locks

pub mod catalog;
mod entity;
mod errors;
mod loader;
mod registry;
mod types;

pub use entity::EntityKind;
pub use errors::{SchemaError, SchemaResult, Severity};
pub use loader::SchemaLoader;
pub use registry::SchemaRegistry;
pub use types::{Constraints, FieldRule, FieldType, Pattern, ReferenceTarget, SchemaDefinition};
