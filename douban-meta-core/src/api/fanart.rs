//! Fanart.tv API client

use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use tokio_util::sync::CancellationToken;

use super::{non_blank, not_found_as_null, trim_base_url};
use crate::cache::{keys, FetchCache, Validate};
use crate::config::FanartConfig;
use crate::http::{HttpClient, RequestOptions};
use crate::models::{CandidateImage, CandidateImages, SubjectType};
use crate::provider::ProviderError;

/// `/v3/{movies|tv}/{id}` payload, only the categories used for artwork
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FanartImages {
    #[serde(default)]
    pub movieposter: Vec<FanartImage>,
    #[serde(default)]
    pub moviebackground: Vec<FanartImage>,
    #[serde(default)]
    pub hdmovielogo: Vec<FanartImage>,
    #[serde(default)]
    pub movielogo: Vec<FanartImage>,
    #[serde(default)]
    pub tvposter: Vec<FanartImage>,
    #[serde(default)]
    pub showbackground: Vec<FanartImage>,
    #[serde(default)]
    pub hdtvlogo: Vec<FanartImage>,
    #[serde(default)]
    pub clearlogo: Vec<FanartImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FanartImage {
    pub url: String,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default, deserialize_with = "deserialize_likes")]
    pub likes: u64,
}

/// Fanart reports likes as a string, occasionally as a number.
fn deserialize_likes<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Likes {
        Number(u64),
        Text(String),
    }

    Ok(match Option::<Likes>::deserialize(deserializer)? {
        Some(Likes::Number(n)) => n,
        Some(Likes::Text(text)) => text.trim().parse().unwrap_or(0),
        None => 0,
    })
}

impl Validate for FanartImages {}

impl FanartImages {
    /// HD logos come first so they win ties on locale and likes.
    #[must_use]
    pub fn into_candidates(self, subject_type: SubjectType) -> CandidateImages {
        let (posters, backdrops, hd_logos, logos) = match subject_type {
            SubjectType::Movie => (
                self.movieposter,
                self.moviebackground,
                self.hdmovielogo,
                self.movielogo,
            ),
            SubjectType::Tv => (self.tvposter, self.showbackground, self.hdtvlogo, self.clearlogo),
        };

        CandidateImages {
            posters: convert(posters),
            backdrops: convert(backdrops),
            logos: convert(hd_logos.into_iter().chain(logos).collect()),
        }
    }
}

fn convert(images: Vec<FanartImage>) -> Vec<CandidateImage> {
    images
        .into_iter()
        .filter(|image| !image.url.is_empty())
        .map(|image| {
            // "00" marks artwork without text
            let language = image.lang.as_deref().filter(|lang| *lang != "00");
            CandidateImage::new(image.url)
                .with_locale(language, None)
                .with_votes(0.0, image.likes)
        })
        .collect()
}

/// Fanart.tv client
///
/// Requests authenticate with the project key; a user's personal key is sent
/// as `client_key` and unlocks images still inside Fanart's embargo window.
pub struct FanartApi {
    http: Arc<dyn HttpClient>,
    cache: FetchCache<FanartImages>,
    base_url: String,
    project_key: Option<String>,
}

impl FanartApi {
    #[must_use]
    pub fn new(http: Arc<dyn HttpClient>, config: &FanartConfig, cache: FetchCache<FanartImages>) -> Self {
        Self {
            http,
            cache,
            base_url: trim_base_url(&config.base_url),
            project_key: non_blank(config.api_key.as_deref()).map(ToString::to_string),
        }
    }

    /// Candidate images for a subject identified by TMDB or IMDb id.
    pub async fn subject_images(
        &self,
        subject_type: SubjectType,
        id: &str,
        personal_key: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Option<CandidateImages>, ProviderError> {
        let personal_key = non_blank(personal_key);
        let api_key = self
            .project_key
            .as_deref()
            .or(personal_key)
            .ok_or(ProviderError::MissingCredential("fanart"))?;

        let mut options = RequestOptions::new().param("api_key", api_key);
        if let Some(client_key) = personal_key {
            options = options.param("client_key", client_key);
        }

        let section = match subject_type {
            SubjectType::Movie => "movies",
            SubjectType::Tv => "tv",
        };
        let url = format!("{}/v3/{}/{}", self.base_url, section, id);
        let key = keys::fanart_images(subject_type, id, personal_key.is_some());
        let http = Arc::clone(&self.http);

        let images = self
            .cache
            .fetch(&key, cancel, move |flight| async move {
                not_found_as_null(http.get_json(&url, &options, &flight).await)
            })
            .await?;

        Ok(images.map(|images| images.into_candidates(subject_type)))
    }
}
