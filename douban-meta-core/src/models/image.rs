//! Image candidates and the resolved artwork set

use serde::{Deserialize, Serialize};

/// One image offered by one provider, tagged with locale and popularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateImage {
    pub url: String,
    /// `None` is the "no language tag" locale, matched by the literal `"null"`
    pub language_code: Option<String>,
    pub country_code: Option<String>,
    pub vote_average: f64,
    pub vote_count: u64,
}

impl CandidateImage {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            language_code: None,
            country_code: None,
            vote_average: 0.0,
            vote_count: 0,
        }
    }

    /// Set the locale tag. Empty codes count as absent.
    #[must_use]
    pub fn with_locale(mut self, language: Option<&str>, country: Option<&str>) -> Self {
        self.language_code = non_empty(language);
        self.country_code = non_empty(country);
        self
    }

    /// Set popularity signals. Negative or non-finite averages become 0.
    #[must_use]
    pub fn with_votes(mut self, average: f64, count: u64) -> Self {
        self.vote_average = if average.is_finite() && average > 0.0 {
            average
        } else {
            0.0
        };
        self.vote_count = count;
        self
    }

    /// Bare language tag, `"null"` when the image carries none.
    #[must_use]
    pub fn language_tag(&self) -> &str {
        self.language_code.as_deref().unwrap_or(NULL_LOCALE)
    }

    /// `lang-COUNTRY` when both are known, otherwise the bare language tag.
    #[must_use]
    pub fn full_tag(&self) -> String {
        match (&self.language_code, &self.country_code) {
            (Some(language), Some(country)) => format!("{language}-{country}"),
            _ => self.language_tag().to_string(),
        }
    }
}

/// Locale code standing for "no language tag".
pub const NULL_LOCALE: &str = "null";

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Candidate images returned by one provider, grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateImages {
    pub posters: Vec<CandidateImage>,
    pub backdrops: Vec<CandidateImage>,
    pub logos: Vec<CandidateImage>,
}

impl CandidateImages {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posters.is_empty() && self.backdrops.is_empty() && self.logos.is_empty()
    }
}

/// Output image category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSlot {
    Poster,
    Background,
    Logo,
}

/// The resolved artwork set.
///
/// Each slot is written at most once; later writers never replace a filled slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrls {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl ImageUrls {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.poster.is_some() && self.background.is_some() && self.logo.is_some()
    }

    /// Fill only the slots that are still empty. Returns the slots filled.
    pub fn merge(&mut self, other: Self) -> Vec<ImageSlot> {
        let mut filled = Vec::new();
        if fill(&mut self.poster, other.poster) {
            filled.push(ImageSlot::Poster);
        }
        if fill(&mut self.background, other.background) {
            filled.push(ImageSlot::Background);
        }
        if fill(&mut self.logo, other.logo) {
            filled.push(ImageSlot::Logo);
        }
        filled
    }
}

fn fill(slot: &mut Option<String>, value: Option<String>) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = value.filter(|v| !v.is_empty());
    slot.is_some()
}
