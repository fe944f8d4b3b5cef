//! Types for catalog API responses.
//!
//! Catalogs are heterogeneous: the same field may arrive as a number in one
//! and as a string (or `null`) in another. Every field is deserialized
//! leniently and falls back to a default instead of failing the response.
//! List items that are not objects, or whose `vod_id` is missing or not a
//! positive number, are dropped on their own; the rest of the page survives.

use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

/// One catalog item as returned by a `videolist` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub vod_id: u64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vod_name: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub type_name: Option<String>,
    /// Cover image URL.
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub vod_pic: Option<String>,
    /// Short tag such as "HD" or the latest episode label.
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub vod_remarks: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub vod_year: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub vod_area: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub vod_lang: Option<String>,
    /// Synopsis, may contain HTML.
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub vod_content: Option<String>,
    /// Playback group names, `$$$`-delimited.
    #[serde(default, deserialize_with = "lenient_string")]
    pub vod_play_from: String,
    /// Playback episode blocks, `$$$`-delimited, co-indexed with `vod_play_from`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub vod_play_url: String,
}

/// A catalog category (`class` entry).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogCategory {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub type_id: u64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub type_name: String,
}

/// A full catalog response page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogPage {
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub page: Option<u64>,
    #[serde(default, rename = "pagecount", deserialize_with = "lenient_opt_u64")]
    pub page_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub total: Option<u64>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub list: Vec<CatalogEntry>,
    #[serde(default, deserialize_with = "lenient_categories")]
    pub class: Vec<CatalogCategory>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Int(i64),
    Float(f64),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ItemOrJunk<T> {
    Item(T),
    Junk(IgnoredAny),
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    match Option::<StringOrNumber>::deserialize(d)? {
        None => Ok(0),
        Some(StringOrNumber::Int(n)) => Ok(n.max(0) as u64),
        Some(StringOrNumber::Float(f)) => Ok(f.max(0.0) as u64),
        Some(StringOrNumber::String(s)) => Ok(s.trim().parse().unwrap_or(0)),
        Some(StringOrNumber::Other(_)) => Ok(0),
    }
}

fn lenient_opt_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Ok(match Option::<StringOrNumber>::deserialize(d)? {
        None => None,
        Some(StringOrNumber::Int(n)) => u64::try_from(n).ok(),
        Some(StringOrNumber::Float(f)) if f >= 0.0 => Some(f as u64),
        Some(StringOrNumber::Float(_)) => None,
        Some(StringOrNumber::String(s)) => s.trim().parse().ok(),
        Some(StringOrNumber::Other(_)) => None,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient_opt_string(d)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<StringOrNumber>::deserialize(d)? {
        None => None,
        Some(StringOrNumber::String(s)) if s.trim().is_empty() => None,
        Some(StringOrNumber::String(s)) => Some(s),
        Some(StringOrNumber::Int(n)) => Some(n.to_string()),
        Some(StringOrNumber::Float(f)) => Some(f.to_string()),
        Some(StringOrNumber::Other(_)) => None,
    })
}

/// Items of a list field that deserialize cleanly; a non-list value is empty.
fn lenient_items<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<ItemOrJunk<Vec<ItemOrJunk<T>>>>::deserialize(d)? {
        Some(ItemOrJunk::Item(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                ItemOrJunk::Item(item) => Some(item),
                ItemOrJunk::Junk(_) => None,
            })
            .collect(),
        Some(ItemOrJunk::Junk(_)) | None => Vec::new(),
    })
}

fn lenient_entries<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<CatalogEntry>, D::Error> {
    let mut entries: Vec<CatalogEntry> = lenient_items(d)?;
    entries.retain(|entry| entry.vod_id != 0);
    Ok(entries)
}

fn lenient_categories<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Vec<CatalogCategory>, D::Error> {
    lenient_items(d)
}
