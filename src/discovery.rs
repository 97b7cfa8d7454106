//! Discovery
//!
//! Scope layout, directory scanning, dependency resolution and the orchestrator
//! that ties them together into one [`DiscoverySession`] per scan.

pub mod layout;
pub mod orchestrator;
pub mod report;
pub mod resolver;
pub mod scanner;
pub mod session;

pub use layout::ScopeLayout;
pub use orchestrator::{DiscoveryOrchestrator, DiscoveryStats, RetryReport};
pub use report::{DiagnosticReport, ReportAgents, ReportOptions};
pub use resolver::{DependencyResolver, Resolution};
pub use scanner::DirectoryScanner;
pub use session::{DiscoverySession, IdCollision};
