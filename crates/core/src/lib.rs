pub mod catalog;
pub mod config;
pub mod manifest;
pub mod metrics;
pub mod search;
pub mod source;
pub mod testing;
pub mod throttle;

pub use catalog::{CatalogCategory, CatalogClient, CatalogEntry, CatalogError, VodClient};
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use manifest::{
    parse_manifest, resolve_playback, Episode, EpisodeGroup, PlaybackError, PlaybackManifest,
    ResolvedPlayback,
};
pub use search::{
    filter_by_visible_source, ResultItem, SearchCoordinator, SearchError, SessionHandle,
    SessionId, SessionOutcome, SessionSnapshot, SourceFilter, SourceProgress, SourceStatus,
};
pub use source::{InMemorySourceRegistry, Source, SourceError, SourceRegistry};
pub use throttle::{Admission, SearchThrottle};
