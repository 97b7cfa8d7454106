//! Roster: Agent Discovery and Dependency Resolution
//!
//! Scans a tree of declarative agent definitions (Markdown unit files carrying a
//! YAML configuration block), extracts normalized metadata, validates it, and
//! resolves every declared dependency against a layered search path
//! (extension scope, shared scope, core scope).

pub mod agent;
pub mod concurrency;
pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod tooling;
pub mod types;

pub use agent::{AgentRecord, DependencyKind};
pub use discovery::{DiscoveryOrchestrator, DiscoverySession};
pub use error::DiscoveryError;
pub use types::{Scope, ScopeContext, ValidationError};
