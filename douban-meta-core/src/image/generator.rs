//! Artwork resolution engine
//!
//! Queries image providers one at a time in priority order. Each provider's
//! candidates are ranked with that provider's locale preference, and the
//! winners fill only the slots still empty. Once poster, background and logo
//! are all set the remaining providers are never queried.
//!
//! A provider that has no mapping or fails is skipped. Cancellation is the
//! only outcome that aborts resolution.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::ranking::select_images;
use crate::error::{Error, Result};
use crate::models::{ImageRequest, ImageUrls};
use crate::provider::{ImageProvider, ProviderError, ProviderKind};

/// Resolves the artwork set for one user's provider configuration.
///
/// Holds no per-call state, so one generator can serve concurrent requests.
#[derive(Clone)]
pub struct ImageUrlGenerator {
    providers: Vec<Arc<dyn ImageProvider>>,
}

impl ImageUrlGenerator {
    /// `providers` in priority order, highest first.
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn ImageProvider>>) -> Self {
        Self { providers }
    }

    pub fn provider_kinds(&self) -> impl Iterator<Item = ProviderKind> + '_ {
        self.providers.iter().map(|provider| provider.kind())
    }

    /// Resolve poster, background and logo for `request`.
    ///
    /// Missing images are not an error: unfilled slots stay `None`.
    /// Returns [`Error::Cancelled`] as soon as `cancel` fires; no partial
    /// result is returned in that case.
    #[tracing::instrument(skip_all, fields(douban_id = request.source.douban_id))]
    pub async fn generate(
        &self,
        request: &ImageRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<ImageUrls> {
        let mut urls = ImageUrls::default();

        for provider in &self.providers {
            let kind = provider.kind();

            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Error::Cancelled),
                outcome = provider.candidate_images(request, cancel) => outcome,
            };

            let candidates = match outcome {
                Ok(Some(candidates)) => candidates,
                Ok(None) => {
                    debug!(provider = %kind, "No mapping for subject, skipping provider");
                    continue;
                }
                Err(ProviderError::Cancelled) => return Err(Error::Cancelled),
                Err(e) if e.is_unconfigured() => {
                    debug!(provider = %kind, error = %e, "Provider not configured, skipping");
                    continue;
                }
                Err(e) => {
                    warn!(provider = %kind, error = %e, "Image provider failed, skipping");
                    continue;
                }
            };

            let filled = urls.merge(select_images(candidates, provider.locale_preference()));
            debug!(provider = %kind, ?filled, "Merged provider images");

            if urls.is_complete() {
                debug!(provider = %kind, "All image slots filled");
                break;
            }
        }

        Ok(urls)
    }
}

impl std::fmt::Debug for ImageUrlGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUrlGenerator")
            .field("providers", &self.provider_kinds().collect::<Vec<_>>())
            .finish()
    }
}
