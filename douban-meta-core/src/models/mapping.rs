//! Douban to external database id mapping

use serde::{Deserialize, Serialize};

use super::ExternalIds;

/// Known external ids of one Douban subject.
///
/// `calibrated` marks mappings confirmed by an administrator; automatic
/// matching must not overwrite them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdMapping {
    pub douban_id: u64,
    #[serde(default)]
    pub tmdb_id: Option<u64>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub trakt_id: Option<u64>,
    #[serde(default)]
    pub calibrated: bool,
}

impl IdMapping {
    /// Mapping with no known external ids.
    #[must_use]
    pub fn empty(douban_id: u64) -> Self {
        Self {
            douban_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn external_ids(&self) -> ExternalIds {
        ExternalIds {
            tmdb_id: self.tmdb_id,
            imdb_id: self.imdb_id.clone(),
        }
    }
}
