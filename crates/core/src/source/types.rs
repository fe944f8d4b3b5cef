use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// One configured content catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Source {
    /// Display name, unique within the registry.
    pub name: String,
    /// Catalog API endpoint, e.g. `https://host/api.php/provide/vod/`.
    pub base_url: String,
}

impl Source {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
        }
    }

    /// The same source with surrounding whitespace stripped from its name.
    pub fn trimmed(mut self) -> Self {
        let name = self.name.trim();
        if name.len() != self.name.len() {
            self.name = name.to_string();
        }
        self
    }
}

/// Keep the first source for each name, in order.
pub fn unique_by_name(sources: impl IntoIterator<Item = Source>) -> Vec<Source> {
    let mut seen = HashSet::new();
    sources
        .into_iter()
        .filter(|source| seen.insert(source.name.clone()))
        .collect()
}

/// Errors from editing the source registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Source name cannot be empty")]
    InvalidName,

    #[error("Source already exists: {0}")]
    DuplicateName(String),

    #[error("Source not found: {0}")]
    NotFound(String),
}
