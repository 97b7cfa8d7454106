//! Agent Definitions
//!
//! Turns unit files into normalized [`AgentRecord`] values: content parsing,
//! metadata extraction, polymorphic field normalization and structural
//! validation. Nothing in this module writes to disk.

pub mod extractor;
pub mod normalize;
pub mod parser;
pub mod record;
pub mod validation;

pub use extractor::{ExtractOutcome, Extractor};
pub use parser::{parse_unit, ParsedUnit};
pub use record::{
    AgentRecord, Command, Dependencies, DependencyKind, OtherDependency, Persona,
    ResolvedDependencies,
};
pub use validation::{validate_record, ValidationResult};
