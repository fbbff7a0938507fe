// Douban Image Provider
//
// Direct source: needs no external id and is always available. Images come
// from what the catalog already returned (cover and stills), each rendered
// through the user's proxy template.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{DoubanExtra, ImageProvider, ProviderError, ProviderKind};
use crate::models::{CandidateImage, CandidateImages, ImageRequest, LocalePreference};
use crate::template::{ProxyTemplateRenderer, TemplateVars};

pub struct DoubanImageProvider {
    renderer: Arc<ProxyTemplateRenderer>,
    proxy_template: Option<String>,
    user_id: String,
    locales: LocalePreference,
}

impl DoubanImageProvider {
    #[must_use]
    pub fn new(renderer: Arc<ProxyTemplateRenderer>, extra: &DoubanExtra, user_id: &str) -> Self {
        Self {
            renderer,
            proxy_template: extra.proxy_template.clone(),
            user_id: user_id.to_string(),
            locales: LocalePreference::default(),
        }
    }

    fn apply_proxy(&self, url: Option<&str>) -> Option<String> {
        let url = url.filter(|u| !u.is_empty())?;
        let rendered = match self.proxy_template.as_deref() {
            Some(template) => self.renderer.render(
                template,
                &TemplateVars {
                    url,
                    user_id: &self.user_id,
                },
            ),
            None => url.to_string(),
        };
        Some(rendered)
    }
}

#[async_trait]
impl ImageProvider for DoubanImageProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Douban
    }

    fn locale_preference(&self) -> &LocalePreference {
        &self.locales
    }

    async fn candidate_images(
        &self,
        request: &ImageRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Option<CandidateImages>, ProviderError> {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        let source = request.source;
        let candidate = |url: Option<&str>| {
            self.apply_proxy(url)
                .map(CandidateImage::new)
                .into_iter()
                .collect::<Vec<_>>()
        };

        Ok(Some(CandidateImages {
            posters: candidate(source.cover.as_deref()),
            backdrops: candidate(source.photos.first().map(String::as_str)),
            logos: Vec::new(),
        }))
    }
}
