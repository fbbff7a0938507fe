// Image Provider Trait
//
// Core interface every image source implements

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{ProviderError, ProviderKind};
use crate::models::{CandidateImages, ImageRequest, LocalePreference};

/// One external image source behind a uniform capability.
///
/// Implementations normalise their provider's payload into
/// [`CandidateImages`], translating provider locale fields into the
/// `language_code`/`country_code` pair.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Locale order used to rank this provider's candidates.
    fn locale_preference(&self) -> &LocalePreference;

    /// Candidate images for the requested subject.
    ///
    /// `Ok(None)` means the provider has no mapping for the subject (for
    /// example no external id); callers skip the provider. Must return
    /// promptly with [`ProviderError::Cancelled`] once `cancel` fires.
    async fn candidate_images(
        &self,
        request: &ImageRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Option<CandidateImages>, ProviderError>;
}
