//! Search sessions across independently queried catalog sources.
//!
//! A session fans one query out to every source in a registry snapshot and
//! publishes its progress as [`SessionSnapshot`]s: results appear per source
//! as each one settles, tagged with where they came from.

mod coordinator;
mod dedup;
mod state;
mod types;

pub use coordinator::{SearchCoordinator, SessionHandle};
pub use dedup::deduplicate_results;
pub use types::*;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("Search query is empty")]
    EmptyQuery,

    #[error("Search superseded by a newer query")]
    Superseded,
}
