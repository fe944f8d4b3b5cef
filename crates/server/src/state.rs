use std::sync::Arc;

use reelflix_core::{CatalogClient, Config, InMemorySourceRegistry, SearchCoordinator};

use crate::api::WsBroadcaster;

/// Shared application state
pub struct AppState {
    config: Config,
    registry: Arc<InMemorySourceRegistry>,
    catalog: Arc<dyn CatalogClient>,
    coordinator: Arc<SearchCoordinator>,
    ws_broadcaster: WsBroadcaster,
}

impl AppState {
    pub fn new(
        config: Config,
        registry: Arc<InMemorySourceRegistry>,
        catalog: Arc<dyn CatalogClient>,
        coordinator: Arc<SearchCoordinator>,
        ws_broadcaster: WsBroadcaster,
    ) -> Self {
        Self {
            config,
            registry,
            catalog,
            coordinator,
            ws_broadcaster,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Arc<InMemorySourceRegistry> {
        &self.registry
    }

    pub fn catalog(&self) -> &dyn CatalogClient {
        self.catalog.as_ref()
    }

    pub fn coordinator(&self) -> &Arc<SearchCoordinator> {
        &self.coordinator
    }

    pub fn ws_broadcaster(&self) -> &WsBroadcaster {
        &self.ws_broadcaster
    }
}
