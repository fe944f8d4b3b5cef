//! Catalog source definitions and the registry that holds them.
//!
//! A source is one independently queryable catalog endpoint. The registry is
//! an ordered list that can be edited at runtime; search sessions take a
//! snapshot of it when they start, so edits never reach an in-flight search.

mod registry;
mod types;

pub use registry::{InMemorySourceRegistry, SourceRegistry};
pub use types::*;
