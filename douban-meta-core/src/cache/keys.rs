//! Composite cache keys
//!
//! Each provider cache has its own key space, so keys carry no global prefix.
//! Keys stay human-readable to make cache logs easy to follow.

use crate::models::{LocalePreference, SubjectType};

/// Douban subject detail: `{subject_id}`
#[must_use]
pub fn subject_detail(subject_id: &str) -> String {
    subject_id.to_string()
}

/// One page of a Douban subject collection: `{collection_id}:{skip}`
#[must_use]
pub fn collection_page(collection_id: &str, skip: u32) -> String {
    format!("{collection_id}:{skip}")
}

/// Split a collection page key back into collection id and offset.
///
/// A key without an offset addresses the first page.
#[must_use]
pub fn parse_collection_page(key: &str) -> (&str, u32) {
    match key.split_once(':') {
        Some((id, skip)) => (id, skip.parse().unwrap_or(0)),
        None => (key, 0),
    }
}

/// TMDB image list: `{type}:{tmdb_id}:{languages}`
///
/// The requested language filter changes the payload, so it is part of the key.
#[must_use]
pub fn tmdb_images(subject_type: SubjectType, tmdb_id: u64, locales: &LocalePreference) -> String {
    format!(
        "{}:{}:{}",
        subject_type.as_str(),
        tmdb_id,
        locales.include_languages()
    )
}

/// Fanart.tv image list: `{type}:{id}:{tier}`
///
/// A personal client key unlocks images still under embargo, so callers with
/// one (`client`) and without one (`project`) never share an entry.
#[must_use]
pub fn fanart_images(subject_type: SubjectType, id: &str, with_client_key: bool) -> String {
    let tier = if with_client_key { "client" } else { "project" };
    format!("{}:{}:{}", subject_type.as_str(), id, tier)
}
