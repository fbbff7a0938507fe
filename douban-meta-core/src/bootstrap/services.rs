//! Service initialization and dependency injection

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    api::{DoubanApi, FanartApi, TmdbApi},
    cache::FetchCache,
    http::{HttpClient, ReqwestHttpClient},
    image::ImageUrlGenerator,
    mapping::{find_or_record, IdMappingStore, InMemoryIdMappingStore},
    models::{ImageRequest, ImageUrls, SourceInfo},
    provider::{ImageProviderConfig, ProviderFactory, UserImageConfig},
    template::ProxyTemplateRenderer,
    Config, Result,
};

/// Container for all initialized services
///
/// Caches live inside the API clients and are shared by every clone.
#[derive(Clone)]
pub struct Services {
    /// Douban subject and collection client
    pub douban: Arc<DoubanApi>,
    pub tmdb: Arc<TmdbApi>,
    pub fanart: Arc<FanartApi>,
    /// Builds image adapters from per-user provider settings
    pub providers: ProviderFactory,
    /// Douban to external id mapping
    pub id_mappings: Arc<dyn IdMappingStore>,
    /// Provider order for users without their own settings
    pub default_providers: Vec<ImageProviderConfig>,
}

/// Initialize all services with the reqwest client and an in-memory id store
pub fn init_services(config: &Config) -> anyhow::Result<Services> {
    let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new(&config.http)?);
    info!("HTTP client initialized");

    Ok(init_services_with(
        config,
        http_client,
        Arc::new(InMemoryIdMappingStore::new()),
    ))
}

/// Initialize all services around the given HTTP client and id store
#[must_use]
pub fn init_services_with(
    config: &Config,
    http_client: Arc<dyn HttpClient>,
    id_mappings: Arc<dyn IdMappingStore>,
) -> Services {
    let caches = &config.cache;

    let douban = Arc::new(DoubanApi::new(
        Arc::clone(&http_client),
        &config.douban,
        FetchCache::from_settings("douban_detail", &caches.douban_detail),
        FetchCache::from_settings("douban_collection", &caches.douban_collection),
    ));
    let tmdb = Arc::new(TmdbApi::new(
        Arc::clone(&http_client),
        &config.tmdb,
        FetchCache::from_settings("tmdb_images", &caches.tmdb_images),
    ));
    let fanart = Arc::new(FanartApi::new(
        http_client,
        &config.fanart,
        FetchCache::from_settings("fanart_images", &caches.fanart_images),
    ));
    info!("API clients initialized");

    let providers = ProviderFactory::new(
        Arc::clone(&tmdb),
        Arc::clone(&fanart),
        Arc::new(ProxyTemplateRenderer::new()),
        config.images.languages.clone(),
    );

    Services {
        douban,
        tmdb,
        fanart,
        providers,
        id_mappings,
        default_providers: config.images.providers.clone(),
    }
}

impl Services {
    /// Generator for one user's provider settings.
    #[must_use]
    pub fn image_generator(&self, user_config: &UserImageConfig, user_id: &str) -> ImageUrlGenerator {
        let configs = user_config
            .image_providers
            .as_deref()
            .unwrap_or(&self.default_providers);

        ImageUrlGenerator::new(self.providers.build_all(configs, user_id))
    }

    /// Resolve artwork for a catalog subject, looking up its external ids.
    pub async fn resolve_images(
        &self,
        source: &SourceInfo,
        user_config: &UserImageConfig,
        user_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ImageUrls> {
        let mapping = find_or_record(self.id_mappings.as_ref(), source.douban_id).await?;
        let external_ids = mapping.external_ids();

        self.image_generator(user_config, user_id)
            .generate(&ImageRequest::new(source, &external_ids), cancel)
            .await
    }
}
