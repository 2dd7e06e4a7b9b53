//! Document validation
//!
//! Two phases per document:
//!
//! 1. `Validator` applies the field rules of the kind's definition
//! 2. `ReferenceChecker` resolves reference and unique fields through the
//!    caller's `ReferenceLookup`, only when phase 1 found nothing
//!
//! Data-quality problems are returned as `Violation`s; only caller errors
//! and lookup failures are `ValidationError`s.

mod errors;
mod memory;
mod pipeline;
mod references;
mod validator;
mod violation;

pub use errors::{ValidationError, ValidationOutcome};
pub use memory::MemoryLookup;
pub use pipeline::{validate_document, validate_patch, DocumentValidator};
pub use references::{LookupError, RecordKey, ReferenceChecker, ReferenceLookup};
pub use validator::{FieldPolicy, ValidationMode, Validator};
pub use violation::{ConstraintKind, ValidationResult, Violation, ViolationKind};
