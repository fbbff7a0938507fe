// TMDB Image Provider

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{ImageProvider, ProviderError, ProviderKind, TmdbExtra};
use crate::api::TmdbApi;
use crate::models::{CandidateImages, ImageRequest, LocalePreference};

/// Queryable only when the subject has a TMDB id.
pub struct TmdbImageProvider {
    api: Arc<TmdbApi>,
    api_key: Option<String>,
    locales: LocalePreference,
}

impl TmdbImageProvider {
    /// `default_languages` applies when the user has not chosen image languages.
    #[must_use]
    pub fn new(api: Arc<TmdbApi>, extra: &TmdbExtra, default_languages: &LocalePreference) -> Self {
        let locales = extra
            .image_languages
            .clone()
            .filter(|languages| !languages.is_empty())
            .unwrap_or_else(|| default_languages.clone());

        Self {
            api,
            api_key: extra.api_key.clone(),
            locales,
        }
    }
}

#[async_trait]
impl ImageProvider for TmdbImageProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Tmdb
    }

    fn locale_preference(&self) -> &LocalePreference {
        &self.locales
    }

    async fn candidate_images(
        &self,
        request: &ImageRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Option<CandidateImages>, ProviderError> {
        let Some(tmdb_id) = request.external_ids.tmdb_id else {
            return Ok(None);
        };

        self.api
            .subject_images(
                request.subject_type(),
                tmdb_id,
                &self.locales,
                self.api_key.as_deref(),
                cancel,
            )
            .await
    }
}
