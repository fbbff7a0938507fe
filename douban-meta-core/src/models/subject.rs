//! Catalog subjects and their identifiers

use serde::{Deserialize, Serialize};

/// Kind of catalog item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
    Movie,
    Tv,
}

impl SubjectType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }
}

impl std::fmt::Display for SubjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the catalog source already knows about a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub douban_id: u64,
    pub subject_type: SubjectType,
    /// Cover image URL from the catalog source
    #[serde(default)]
    pub cover: Option<String>,
    /// Stills from the catalog source, best first
    #[serde(default)]
    pub photos: Vec<String>,
}

/// Identifiers of the subject in other databases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalIds {
    #[serde(default)]
    pub tmdb_id: Option<u64>,
    #[serde(default)]
    pub imdb_id: Option<String>,
}

impl ExternalIds {
    /// IMDb id, ignoring blank values.
    #[must_use]
    pub fn imdb(&self) -> Option<&str> {
        self.imdb_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

/// Input of one artwork resolution.
#[derive(Debug, Clone, Copy)]
pub struct ImageRequest<'a> {
    pub source: &'a SourceInfo,
    pub external_ids: &'a ExternalIds,
}

impl<'a> ImageRequest<'a> {
    #[must_use]
    pub const fn new(source: &'a SourceInfo, external_ids: &'a ExternalIds) -> Self {
        Self {
            source,
            external_ids,
        }
    }

    #[must_use]
    pub const fn subject_type(&self) -> SubjectType {
        self.source.subject_type
    }
}
