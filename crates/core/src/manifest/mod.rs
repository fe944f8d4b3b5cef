//! Playback manifest parsing.
//!
//! A catalog item carries two co-indexed delimited strings:
//!
//! ```text
//! vod_play_from: "mirrorA$$$mirrorB"
//! vod_play_url:  "Ep1$https://a/1.m3u8#Ep2$https://a/2.m3u8$$$Ep1$https://b/1.m3u8"
//! ```
//!
//! Parsing turns them into ordered episode groups holding only streams the
//! player can handle. Malformed input is never an error; offending groups and
//! episodes are dropped.

mod parser;
mod resolve;
mod types;

pub use parser::{
    parse_manifest, EPISODE_DELIMITER, GROUP_DELIMITER, NAME_URL_DELIMITER, STREAM_SUFFIX,
};
pub use resolve::{resolve_playback, PlaybackError, ResolvedPlayback};
pub use types::*;
