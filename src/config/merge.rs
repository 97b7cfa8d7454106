//! Config composition: merge policy and the service that applies it.

mod merge_policy;
pub mod service;
