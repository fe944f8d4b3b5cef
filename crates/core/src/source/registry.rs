use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use super::{unique_by_name, Source, SourceError};

/// Read-only view of the configured sources.
#[async_trait]
pub trait SourceRegistry: Send + Sync {
    /// Current sources, in display order.
    async fn list_sources(&self) -> Vec<Source>;
}

/// Ordered, runtime-editable source list.
#[derive(Debug, Default)]
pub struct InMemorySourceRegistry {
    sources: RwLock<Vec<Source>>,
}

impl InMemorySourceRegistry {
    /// Create a registry from an initial source list.
    ///
    /// Names are trimmed; later duplicates of an already-seen name are skipped.
    pub fn new(initial: Vec<Source>) -> Self {
        let sources = unique_by_name(initial.into_iter().map(Source::trimmed));
        Self {
            sources: RwLock::new(sources),
        }
    }

    /// Append a source to the end of the list. The name is stored trimmed.
    pub async fn add_source(&self, source: Source) -> Result<(), SourceError> {
        let source = source.trimmed();
        if source.name.is_empty() {
            return Err(SourceError::InvalidName);
        }

        let mut sources = self.sources.write().await;
        if sources.iter().any(|s| s.name == source.name) {
            return Err(SourceError::DuplicateName(source.name));
        }

        info!(name = %source.name, base_url = %source.base_url, "Source added");
        sources.push(source);
        Ok(())
    }

    /// Remove a source by name, returning it.
    pub async fn remove_source(&self, name: &str) -> Result<Source, SourceError> {
        let mut sources = self.sources.write().await;
        match sources.iter().position(|s| s.name == name) {
            Some(idx) => {
                let removed = sources.remove(idx);
                info!(name = %removed.name, "Source removed");
                Ok(removed)
            }
            None => Err(SourceError::NotFound(name.to_string())),
        }
    }

    /// Look up a source by name.
    pub async fn get(&self, name: &str) -> Option<Source> {
        self.sources
            .read()
            .await
            .iter()
            .find(|s| s.name == name)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.sources.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sources.read().await.is_empty()
    }
}

#[async_trait]
impl SourceRegistry for InMemorySourceRegistry {
    async fn list_sources(&self) -> Vec<Source> {
        self.sources.read().await.clone()
    }
}
