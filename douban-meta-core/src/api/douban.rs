//! Douban (frodo) API client

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::{non_blank, not_found_as_null, trim_base_url};
use crate::cache::{keys, FetchCache, Validate};
use crate::config::DoubanConfig;
use crate::http::{HttpClient, RequestOptions};
use crate::models::{SourceInfo, SubjectType};
use crate::provider::ProviderError;

/// Items per collection page
pub const PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    #[serde(default)]
    pub large: Option<String>,
    #[serde(default)]
    pub normal: Option<String>,
}

/// Cover image; collection items send an object, some endpoints a bare URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cover {
    Url(String),
    Image { url: String },
}

impl Cover {
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Url(url) | Self::Image { url } => url,
        }
    }
}

/// `/subject/{id}` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectDetail {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub subject_type: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub intro: Option<String>,
    #[serde(default)]
    pub pic: Option<Picture>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl Validate for SubjectDetail {
    fn validate(&self) -> Result<(), String> {
        validate_subject(&self.id, &self.title)
    }
}

impl SubjectDetail {
    /// Best available cover: `cover_url`, then the large picture, then the normal one.
    #[must_use]
    pub fn cover(&self) -> Option<&str> {
        let pic = self.pic.as_ref();
        [
            self.cover_url.as_deref(),
            pic.and_then(|pic| pic.large.as_deref()),
            pic.and_then(|pic| pic.normal.as_deref()),
        ]
        .into_iter()
        .flatten()
        .find(|url| !url.is_empty())
    }

    /// Artwork source info; `None` for subjects that are neither movie nor tv.
    #[must_use]
    pub fn source_info(&self) -> Option<SourceInfo> {
        Some(SourceInfo {
            douban_id: self.id.parse().ok()?,
            subject_type: parse_subject_type(&self.subject_type)?,
            cover: self.cover().map(ToString::to_string),
            photos: Vec::new(),
        })
    }
}

/// One entry of a subject collection page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub subject_type: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub cover: Option<Cover>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub rating: Option<Rating>,
}

impl CollectionItem {
    #[must_use]
    pub fn source_info(&self) -> Option<SourceInfo> {
        Some(SourceInfo {
            douban_id: self.id.parse().ok()?,
            subject_type: parse_subject_type(&self.subject_type)?,
            cover: self
                .cover
                .as_ref()
                .map(|cover| cover.url().to_string())
                .filter(|url| !url.is_empty()),
            photos: self.photos.clone(),
        })
    }
}

/// `/subject_collection/{id}/items` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectCollection {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub start: u32,
    #[serde(default)]
    pub count: u32,
    pub subject_collection_items: Vec<CollectionItem>,
}

impl Validate for SubjectCollection {
    fn validate(&self) -> Result<(), String> {
        self.subject_collection_items
            .iter()
            .try_for_each(|item| validate_subject(&item.id, &item.title))
    }
}

impl SubjectCollection {
    /// Whether another page follows this one.
    #[must_use]
    pub fn has_more(&self) -> bool {
        let len = u32::try_from(self.subject_collection_items.len()).unwrap_or(u32::MAX);
        self.start.saturating_add(len) < self.total
    }
}

fn validate_subject(id: &str, title: &str) -> Result<(), String> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid subject id {id:?}"));
    }
    if title.trim().is_empty() {
        return Err(format!("subject {id} has no title"));
    }
    Ok(())
}

fn parse_subject_type(value: &str) -> Option<SubjectType> {
    match value {
        "movie" => Some(SubjectType::Movie),
        "tv" => Some(SubjectType::Tv),
        _ => None,
    }
}

/// Douban client
pub struct DoubanApi {
    http: Arc<dyn HttpClient>,
    detail_cache: FetchCache<SubjectDetail>,
    collection_cache: FetchCache<SubjectCollection>,
    base_url: String,
    api_key: Option<String>,
    referer: String,
}

impl DoubanApi {
    #[must_use]
    pub fn new(
        http: Arc<dyn HttpClient>,
        config: &DoubanConfig,
        detail_cache: FetchCache<SubjectDetail>,
        collection_cache: FetchCache<SubjectCollection>,
    ) -> Self {
        Self {
            http,
            detail_cache,
            collection_cache,
            base_url: trim_base_url(&config.base_url),
            api_key: non_blank(config.api_key.as_deref()).map(ToString::to_string),
            referer: config.referer.clone(),
        }
    }

    fn request_options(&self) -> RequestOptions {
        let mut options = RequestOptions::new().header("Referer", self.referer.clone());
        if let Some(api_key) = &self.api_key {
            options = options.param("apiKey", api_key);
        }
        options
    }

    pub async fn subject_detail(
        &self,
        subject_id: u64,
        cancel: &CancellationToken,
    ) -> Result<Option<SubjectDetail>, ProviderError> {
        let key = keys::subject_detail(&subject_id.to_string());
        let url = format!("{}/subject/{}", self.base_url, key);
        let options = self.request_options();
        let http = Arc::clone(&self.http);

        let detail = self
            .detail_cache
            .fetch(&key, cancel, move |flight| async move {
                not_found_as_null(http.get_json(&url, &options, &flight).await)
            })
            .await?;

        Ok(detail)
    }

    /// One page of a collection, `skip` items in.
    pub async fn subject_collection(
        &self,
        collection_id: &str,
        skip: u32,
        cancel: &CancellationToken,
    ) -> Result<Option<SubjectCollection>, ProviderError> {
        let key = keys::collection_page(collection_id, skip);
        let (id, start) = keys::parse_collection_page(&key);
        let url = format!("{}/subject_collection/{}/items", self.base_url, id);
        let options = self
            .request_options()
            .param("start", start)
            .param("count", PAGE_SIZE);
        let http = Arc::clone(&self.http);

        let collection = self
            .collection_cache
            .fetch(&key, cancel, move |flight| async move {
                not_found_as_null(http.get_json(&url, &options, &flight).await)
            })
            .await?;

        Ok(collection)
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

    fn api(server: &MockServer) -> DoubanApi {
        let config = DoubanConfig {
            base_url: server.uri(),
            api_key: Some("douban-key".to_string()),
            ..DoubanConfig::default()
        };
        let http = Arc::new(ReqwestHttpClient::new(&HttpConfig::default()).unwrap());
        DoubanApi::new(
            http,
            &config,
            FetchCache::new("douban_detail", 100, Duration::from_secs(60)),
            FetchCache::new("douban_collection", 100, Duration::from_secs(60)),
        )
    }

    #[test]
    fn test_cover_prefers_cover_url() {
        let detail = |extra: serde_json::Value| -> SubjectDetail {
            let mut value = json!({ "id": "1", "title": "t", "type": "movie" });
            value.as_object_mut().unwrap().extend(extra.as_object().unwrap().clone());
            serde_json::from_value(value).unwrap()
        };

        let both = detail(json!({
            "cover_url": "https://img/cover.jpg",
            "pic": { "large": "https://img/l.jpg", "normal": "https://img/n.jpg" }
        }));
        assert_eq!(both.cover(), Some("https://img/cover.jpg"));

        let blank = detail(json!({
            "cover_url": "",
            "pic": { "normal": "https://img/n.jpg" }
        }));
        assert_eq!(blank.cover(), Some("https://img/n.jpg"));

        assert_eq!(detail(json!({})).cover(), None);
    }

    #[test]
    fn test_has_more_saturates_on_large_start() {
        let page: SubjectCollection = serde_json::from_value(json!({
            "total": 5,
            "start": u32::MAX,
            "count": 1,
            "subject_collection_items": [{ "id": "1", "title": "t", "type": "movie" }]
        }))
        .unwrap();
        assert!(!page.has_more());

        let page: SubjectCollection = serde_json::from_value(json!({
            "total": 30,
            "start": 10,
            "count": 1,
            "subject_collection_items": [{ "id": "1", "title": "t", "type": "movie" }]
        }))
        .unwrap();
        assert!(page.has_more());
    }

    #[tokio::test]
    async fn test_subject_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subject/1292052"))
            .and(query_param("apiKey", "douban-key"))
            .and(header("Referer", DoubanConfig::default().referer.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "1292052",
                "title": "肖申克的救赎",
                "type": "movie",
                "year": "1994",
                "pic": { "large": "https://img/l.jpg", "normal": "https://img/n.jpg" },
                "rating": { "value": 9.7, "count": 3000000, "max": 10 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = api(&server);
        let detail = api
            .subject_detail(1292052, &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.cover(), Some("https://img/l.jpg"));

        let source = detail.source_info().unwrap();
        assert_eq!(source.douban_id, 1292052);
        assert_eq!(source.subject_type, SubjectType::Movie);

        // Served from cache
        let again = api.subject_detail(1292052, &CancellationToken::new()).await.unwrap();
        assert_eq!(again, Some(detail));
    }

    #[tokio::test]
    async fn test_invalid_detail_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subject/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "7", "title": "", "type": "movie"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let api = api(&server);
        for _ in 0..2 {
            let detail = api.subject_detail(7, &CancellationToken::new()).await.unwrap();
            assert!(detail.is_none());
        }
    }

    #[tokio::test]
    async fn test_subject_collection_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subject_collection/movie_showing/items"))
            .and(query_param("start", "10"))
            .and(query_param("count", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 25,
                "start": 10,
                "count": 10,
                "subject_collection_items": [
                    {
                        "id": "35267208",
                        "title": "流浪地球2",
                        "type": "movie",
                        "cover": { "url": "https://img/c.jpg", "width": 100 },
                        "photos": ["https://img/p1.jpg", "https://img/p2.jpg"]
                    },
                    { "id": "26794435", "title": "哪吒", "type": "tv", "cover": "https://img/d.jpg" },
                    { "id": "1000", "title": "某书", "type": "book" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = api(&server)
            .subject_collection("movie_showing", 10, &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();

        assert!(page.has_more());
        let first = page.subject_collection_items[0].source_info().unwrap();
        assert_eq!(first.cover.as_deref(), Some("https://img/c.jpg"));
        assert_eq!(first.photos.len(), 2);
        let second = page.subject_collection_items[1].source_info().unwrap();
        assert_eq!(second.subject_type, SubjectType::Tv);
        assert_eq!(second.cover.as_deref(), Some("https://img/d.jpg"));
        assert!(page.subject_collection_items[2].source_info().is_none());
    }

    #[test]
    fn test_validate_rejects_bad_ids() {
        assert!(validate_subject("", "x").is_err());
        assert!(validate_subject("12a", "x").is_err());
        assert!(validate_subject("12", " ").is_err());
        assert!(validate_subject("12", "x").is_ok());
    }
}
