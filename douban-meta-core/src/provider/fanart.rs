// Fanart.tv Image Provider

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{FanartExtra, ImageProvider, ProviderError, ProviderKind};
use crate::api::FanartApi;
use crate::models::{CandidateImages, ImageRequest, LocalePreference};

/// Queryable when the subject has a TMDB id, else an IMDb id.
pub struct FanartImageProvider {
    api: Arc<FanartApi>,
    api_key: Option<String>,
    locales: LocalePreference,
}

impl FanartImageProvider {
    #[must_use]
    pub fn new(api: Arc<FanartApi>, extra: &FanartExtra, languages: &LocalePreference) -> Self {
        Self {
            api,
            api_key: extra.api_key.clone(),
            locales: languages.clone(),
        }
    }
}

#[async_trait]
impl ImageProvider for FanartImageProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Fanart
    }

    fn locale_preference(&self) -> &LocalePreference {
        &self.locales
    }

    async fn candidate_images(
        &self,
        request: &ImageRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Option<CandidateImages>, ProviderError> {
        let ids = request.external_ids;
        let Some(id) = ids
            .tmdb_id
            .map(|id| id.to_string())
            .or_else(|| ids.imdb().map(ToString::to_string))
        else {
            return Ok(None);
        };

        self.api
            .subject_images(request.subject_type(), &id, self.api_key.as_deref(), cancel)
            .await
    }
}
