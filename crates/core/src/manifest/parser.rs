use super::{Episode, EpisodeGroup};

/// Separates playback groups in both descriptor strings.
pub const GROUP_DELIMITER: &str = "$$$";
/// Separates episodes within one group block.
pub const EPISODE_DELIMITER: char = '#';
/// Separates an episode's display name from its URL.
pub const NAME_URL_DELIMITER: char = '$';
/// Only URLs ending with this suffix are playable.
pub const STREAM_SUFFIX: &str = ".m3u8";

/// Parse a raw playback descriptor into ordered episode groups.
///
/// Group names and group blocks are paired positionally; surplus on either
/// side is ignored. Episodes without a URL, or whose URL lacks
/// [`STREAM_SUFFIX`], are dropped, and groups left empty are dropped too.
pub fn parse_manifest(group_names_raw: &str, group_urls_raw: &str) -> Vec<EpisodeGroup> {
    group_names_raw
        .split(GROUP_DELIMITER)
        .zip(group_urls_raw.split(GROUP_DELIMITER))
        .filter_map(|(name, block)| {
            let episodes: Vec<Episode> = block
                .split(EPISODE_DELIMITER)
                .filter_map(parse_episode)
                .collect();
            if episodes.is_empty() {
                None
            } else {
                Some(EpisodeGroup {
                    name: name.to_string(),
                    episodes,
                })
            }
        })
        .collect()
}

fn parse_episode(entry: &str) -> Option<Episode> {
    // Anything after a second `$` is ignored.
    let mut parts = entry.split(NAME_URL_DELIMITER);
    let name = parts.next()?;
    let url = parts.next()?;

    if url.is_empty() || !url.ends_with(STREAM_SUFFIX) {
        return None;
    }

    Some(Episode {
        name: name.to_string(),
        url: url.to_string(),
    })
}
