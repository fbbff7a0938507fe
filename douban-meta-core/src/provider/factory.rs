// Provider Factory
//
// Turns image provider configuration into adapter instances. Adapters are
// built once per resolution setup and then only called, never re-dispatched
// by name.

use std::sync::Arc;

use super::{
    DoubanImageProvider, FanartImageProvider, ImageProvider, ImageProviderConfig,
    TmdbImageProvider,
};
use crate::api::{FanartApi, TmdbApi};
use crate::models::LocalePreference;
use crate::template::ProxyTemplateRenderer;

/// Shared clients every adapter is built from
#[derive(Clone)]
pub struct ProviderFactory {
    tmdb: Arc<TmdbApi>,
    fanart: Arc<FanartApi>,
    renderer: Arc<ProxyTemplateRenderer>,
    languages: LocalePreference,
}

impl ProviderFactory {
    /// `languages` is the deployment default image locale order.
    #[must_use]
    pub fn new(
        tmdb: Arc<TmdbApi>,
        fanart: Arc<FanartApi>,
        renderer: Arc<ProxyTemplateRenderer>,
        languages: LocalePreference,
    ) -> Self {
        Self {
            tmdb,
            fanart,
            renderer,
            languages,
        }
    }

    /// Build the adapter for one configured provider.
    #[must_use]
    pub fn build(&self, config: &ImageProviderConfig, user_id: &str) -> Arc<dyn ImageProvider> {
        match config {
            ImageProviderConfig::Douban(extra) => Arc::new(DoubanImageProvider::new(
                Arc::clone(&self.renderer),
                extra,
                user_id,
            )),
            ImageProviderConfig::Fanart(extra) => Arc::new(FanartImageProvider::new(
                Arc::clone(&self.fanart),
                extra,
                &self.languages,
            )),
            ImageProviderConfig::Tmdb(extra) => Arc::new(TmdbImageProvider::new(
                Arc::clone(&self.tmdb),
                extra,
                &self.languages,
            )),
        }
    }

    /// Build adapters for `configs`, keeping their priority order.
    #[must_use]
    pub fn build_all(
        &self,
        configs: &[ImageProviderConfig],
        user_id: &str,
    ) -> Vec<Arc<dyn ImageProvider>> {
        configs
            .iter()
            .map(|config| self.build(config, user_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FetchCache;
    use crate::config::{FanartConfig, HttpConfig, TmdbConfig};
    use crate::http::ReqwestHttpClient;
    use crate::provider::{ProviderKind, TmdbExtra};
    use std::time::Duration;

    fn factory() -> ProviderFactory {
        let http = Arc::new(ReqwestHttpClient::new(&HttpConfig::default()).unwrap());
        let tmdb = TmdbApi::new(
            http.clone(),
            &TmdbConfig::default(),
            FetchCache::new("tmdb_images", 10, Duration::from_secs(60)),
        );
        let fanart = FanartApi::new(
            http,
            &FanartConfig::default(),
            FetchCache::new("fanart_images", 10, Duration::from_secs(60)),
        );
        ProviderFactory::new(
            Arc::new(tmdb),
            Arc::new(fanart),
            Arc::new(ProxyTemplateRenderer::new()),
            LocalePreference::new(["en", "null"]),
        )
    }

    #[test]
    fn test_build_all_keeps_order() {
        let configs = [
            ImageProviderConfig::bare(ProviderKind::Tmdb),
            ImageProviderConfig::bare(ProviderKind::Douban),
            ImageProviderConfig::bare(ProviderKind::Fanart),
        ];
        let kinds: Vec<_> = factory()
            .build_all(&configs, "u1")
            .iter()
            .map(|provider| provider.kind())
            .collect();

        assert_eq!(kinds, vec![ProviderKind::Tmdb, ProviderKind::Douban, ProviderKind::Fanart]);
    }

    #[test]
    fn test_default_languages_apply_unless_overridden() {
        let factory = factory();
        let fallback = factory.build(&ImageProviderConfig::bare(ProviderKind::Tmdb), "u1");
        assert_eq!(fallback.locale_preference(), &LocalePreference::new(["en", "null"]));

        let custom = factory.build(
            &ImageProviderConfig::Tmdb(TmdbExtra {
                api_key: None,
                image_languages: Some(LocalePreference::new(["ja"])),
            }),
            "u1",
        );
        assert_eq!(custom.locale_preference(), &LocalePreference::new(["ja"]));
    }
}
