//! TMDB image API client

use std::sync::Arc;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::{non_blank, not_found_as_null, trim_base_url};
use crate::cache::{keys, FetchCache, Validate};
use crate::config::TmdbConfig;
use crate::http::{HttpClient, RequestOptions};
use crate::models::{CandidateImage, CandidateImages, LocalePreference, SubjectType};
use crate::provider::ProviderError;

/// `/3/{type}/{id}/images` payload
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbImages {
    pub posters: Vec<TmdbImage>,
    pub backdrops: Vec<TmdbImage>,
    pub logos: Vec<TmdbImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbImage {
    pub file_path: String,
    #[serde(default)]
    pub iso_639_1: Option<String>,
    #[serde(default)]
    pub iso_3166_1: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
}

impl Validate for TmdbImages {}

impl TmdbImages {
    /// Expand file paths against `image_base_url`; entries without a path are dropped.
    #[must_use]
    pub fn into_candidates(self, image_base_url: &str) -> CandidateImages {
        let convert = |images: Vec<TmdbImage>| -> Vec<CandidateImage> {
            images
                .into_iter()
                .filter(|image| !image.file_path.is_empty())
                .map(|image| {
                    CandidateImage::new(format!("{image_base_url}{}", image.file_path))
                        .with_locale(image.iso_639_1.as_deref(), image.iso_3166_1.as_deref())
                        .with_votes(
                            image.vote_average.unwrap_or_default(),
                            image.vote_count.unwrap_or_default(),
                        )
                })
                .collect()
        };

        CandidateImages {
            posters: convert(self.posters),
            backdrops: convert(self.backdrops),
            logos: convert(self.logos),
        }
    }
}

/// TMDB client
///
/// Authenticates with a v4 read access token: the caller's personal token
/// when given, otherwise the deployment's shared default.
pub struct TmdbApi {
    http: Arc<dyn HttpClient>,
    cache: FetchCache<TmdbImages>,
    base_url: String,
    image_base_url: String,
    default_token: Option<String>,
}

impl TmdbApi {
    #[must_use]
    pub fn new(http: Arc<dyn HttpClient>, config: &TmdbConfig, cache: FetchCache<TmdbImages>) -> Self {
        Self {
            http,
            cache,
            base_url: trim_base_url(&config.base_url),
            image_base_url: trim_base_url(&config.image_base_url),
            default_token: non_blank(config.api_key.as_deref()).map(ToString::to_string),
        }
    }

    /// Candidate images for a TMDB subject, filtered to `locales`' languages.
    ///
    /// `Ok(None)` when TMDB does not know the id.
    pub async fn subject_images(
        &self,
        subject_type: SubjectType,
        tmdb_id: u64,
        locales: &LocalePreference,
        api_key: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Option<CandidateImages>, ProviderError> {
        let token = non_blank(api_key)
            .or(self.default_token.as_deref())
            .ok_or(ProviderError::MissingCredential("tmdb"))?;

        let url = format!("{}/3/{}/{}/images", self.base_url, subject_type, tmdb_id);
        let options = RequestOptions::new()
            .param("include_image_language", locales.include_languages())
            .header("Authorization", format!("Bearer {token}"));
        let http = Arc::clone(&self.http);

        let images = self
            .cache
            .fetch(&keys::tmdb_images(subject_type, tmdb_id, locales), cancel, move |flight| async move {
                not_found_as_null(http.get_json(&url, &options, &flight).await)
            })
            .await?;

        Ok(images.map(|images| images.into_candidates(&self.image_base_url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::http::ReqwestHttpClient;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api(server: &MockServer, default_token: Option<&str>) -> TmdbApi {
        let config = TmdbConfig {
            base_url: server.uri(),
            image_base_url: "https://image.tmdb.org/t/p/original".to_string(),
            api_key: default_token.map(ToString::to_string),
        };
        let http = Arc::new(ReqwestHttpClient::new(&HttpConfig::default()).unwrap());
        TmdbApi::new(http, &config, FetchCache::new("tmdb_images", 100, Duration::from_secs(60)))
    }

    fn payload() -> serde_json::Value {
        json!({
            "id": 1399,
            "posters": [
                { "file_path": "/en.jpg", "iso_639_1": "en", "iso_3166_1": "US", "vote_average": 5.3, "vote_count": 10 },
                { "file_path": "/zh.jpg", "iso_639_1": "zh", "iso_3166_1": "CN", "vote_average": 1.0, "vote_count": 1 }
            ],
            "backdrops": [
                { "file_path": "/bg.jpg", "iso_639_1": null, "vote_average": 0, "vote_count": 0 }
            ],
            "logos": []
        })
    }

    #[tokio::test]
    async fn test_subject_images_normalises_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/tv/1399/images"))
            .and(query_param("include_image_language", "zh,null,en"))
            .and(header("Authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload()))
            .expect(1)
            .mount(&server)
            .await;

        let images = api(&server, Some("shared-token"))
            .subject_images(
                SubjectType::Tv,
                1399,
                &LocalePreference::default(),
                Some("user-token"),
                &CancellationToken::new(),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(images.posters.len(), 2);
        assert_eq!(images.posters[0].url, "https://image.tmdb.org/t/p/original/en.jpg");
        assert_eq!(images.posters[1].full_tag(), "zh-CN");
        assert_eq!(images.backdrops[0].language_tag(), "null");
        assert!(images.logos.is_empty());
    }

    #[tokio::test]
    async fn test_falls_back_to_shared_token_and_caches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/movie/603/images"))
            .and(header("Authorization", "Bearer shared-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload()))
            .expect(1)
            .mount(&server)
            .await;

        let api = api(&server, Some("shared-token"));
        let locales = LocalePreference::default();
        for _ in 0..2 {
            let images = api
                .subject_images(SubjectType::Movie, 603, &locales, Some("  "), &CancellationToken::new())
                .await
                .unwrap();
            assert!(images.is_some());
        }
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let server = MockServer::start().await;
        let err = api(&server, None)
            .subject_images(
                SubjectType::Movie,
                603,
                &LocalePreference::default(),
                None,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::MissingCredential("tmdb")));
    }

    #[tokio::test]
    async fn test_unknown_id_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "status_code": 34 })))
            .mount(&server)
            .await;

        let images = api(&server, Some("shared-token"))
            .subject_images(
                SubjectType::Movie,
                1,
                &LocalePreference::default(),
                None,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(images.is_none());
    }
}
