//! End-to-end artwork resolution through `Services`

use std::sync::Arc;

use douban_meta_core::{
    bootstrap::services::init_services_with,
    config::{Config, HttpConfig},
    http::ReqwestHttpClient,
    mapping::{IdMappingStore, InMemoryIdMappingStore},
    models::{IdMapping, SourceInfo, SubjectType},
    provider::UserImageConfig,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.douban.base_url = server.uri();
    config.tmdb.base_url = server.uri();
    config.fanart.base_url = server.uri();
    config
}

fn user_config(value: serde_json::Value) -> UserImageConfig {
    serde_json::from_value(value).unwrap()
}

fn source(douban_id: u64, subject_type: SubjectType) -> SourceInfo {
    SourceInfo {
        douban_id,
        subject_type,
        cover: Some("https://img9.doubanio.com/view/photo/s_ratio_poster/public/p480747492.jpg".to_string()),
        photos: Vec::new(),
    }
}

#[tokio::test]
async fn test_unmapped_subject_falls_through_to_douban_cover() {
    let server = MockServer::start().await;
    let store = Arc::new(InMemoryIdMappingStore::new());
    let services = init_services_with(
        &config_for(&server),
        Arc::new(ReqwestHttpClient::new(&HttpConfig::default()).unwrap()),
        store.clone(),
    );
    let user_config = user_config(json!({
        "imageProviders": [
            { "provider": "fanart", "extra": {} },
            { "provider": "tmdb", "extra": {} },
            {
                "provider": "douban",
                "extra": { "proxyTemplate": "https://proxy.example/{{userId}}?url={{url | url_encode}}" }
            }
        ]
    }));

    let urls = services
        .resolve_images(
            &source(1292052, SubjectType::Movie),
            &user_config,
            "user-1",
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        urls.poster.as_deref(),
        Some("https://proxy.example/user-1?url=https%3A%2F%2Fimg9.doubanio.com%2Fview%2Fphoto%2Fs_ratio_poster%2Fpublic%2Fp480747492.jpg")
    );
    assert!(urls.background.is_none());
    assert!(urls.logo.is_none());

    // Neither external provider had an id to query
    assert!(server.received_requests().await.unwrap().is_empty());
    // The unseen subject is recorded for calibration
    assert_eq!(store.get(1292052).await.unwrap(), Some(IdMapping::empty(1292052)));
}

#[tokio::test]
async fn test_providers_fill_slots_in_priority_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/movies/278"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movieposter": [{ "url": "https://fanart/poster.jpg", "lang": "en", "likes": "3" }],
            "hdmovielogo": [
                { "url": "https://fanart/logo-en.png", "lang": "en", "likes": "10" },
                { "url": "https://fanart/logo-zh.png", "lang": "zh", "likes": "1" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/3/movie/278/images"))
        .and(header("Authorization", "Bearer personal-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "posters": [{ "file_path": "/tmdb-poster.jpg", "iso_639_1": "zh", "iso_3166_1": "CN", "vote_average": 5.0, "vote_count": 4 }],
            "backdrops": [{ "file_path": "/tmdb-backdrop.jpg", "iso_639_1": null, "vote_average": 5.0, "vote_count": 4 }],
            "logos": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.fanart.api_key = Some("project".to_string());
    let store = Arc::new(InMemoryIdMappingStore::with_mappings([IdMapping {
        douban_id: 1292052,
        tmdb_id: Some(278),
        imdb_id: Some("tt0111161".to_string()),
        trakt_id: None,
        calibrated: true,
    }]));
    let services = init_services_with(
        &config,
        Arc::new(ReqwestHttpClient::new(&HttpConfig::default()).unwrap()),
        store,
    );
    let user_config = user_config(json!({
        "imageProviders": [
            { "provider": "fanart" },
            { "provider": "tmdb", "extra": { "apiKey": "personal-token" } },
            { "provider": "douban" }
        ]
    }));

    let urls = services
        .resolve_images(
            &source(1292052, SubjectType::Movie),
            &user_config,
            "user-1",
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    // Fanart wins poster and logo; the Chinese logo outranks the popular English one
    assert_eq!(urls.poster.as_deref(), Some("https://fanart/poster.jpg"));
    assert_eq!(urls.logo.as_deref(), Some("https://fanart/logo-zh.png"));
    // TMDB only fills what fanart left empty
    assert_eq!(
        urls.background.as_deref(),
        Some("https://image.tmdb.org/t/p/original/tmdb-backdrop.jpg")
    );
}

#[tokio::test]
async fn test_default_providers_apply_without_user_settings() {
    let server = MockServer::start().await;
    let services = init_services_with(
        &config_for(&server),
        Arc::new(ReqwestHttpClient::new(&HttpConfig::default()).unwrap()),
        Arc::new(InMemoryIdMappingStore::new()),
    );

    let generator = services.image_generator(&UserImageConfig::default(), "user-1");
    assert_eq!(generator.provider_kinds().count(), 3);

    let urls = services
        .resolve_images(
            &source(1, SubjectType::Tv),
            &UserImageConfig::default(),
            "user-1",
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert!(urls.poster.is_some());
}

#[tokio::test]
async fn test_cancelled_request_returns_no_result() {
    let server = MockServer::start().await;
    let services = init_services_with(
        &config_for(&server),
        Arc::new(ReqwestHttpClient::new(&HttpConfig::default()).unwrap()),
        Arc::new(InMemoryIdMappingStore::new()),
    );

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = services
        .resolve_images(
            &source(1, SubjectType::Movie),
            &UserImageConfig::default(),
            "user-1",
            &cancel,
        )
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
}
