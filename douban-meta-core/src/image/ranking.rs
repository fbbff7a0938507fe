//! Locale-aware image ranking
//!
//! Candidates are ordered by three keys, compared in turn:
//! 1. locale rank: index of the candidate's `lang-COUNTRY` tag in the
//!    preference list, else the index of its bare language, else last
//! 2. vote average, higher first
//! 3. vote count, higher first
//!
//! Locale always dominates popularity. The sort is stable, so candidates that
//! tie on all three keys keep the provider's order.
//!
//! Matching only ever widens the candidate's tag: a candidate tagged `zh-CN`
//! can match a `zh` preference, but a bare `zh` candidate never matches a
//! `zh-CN` preference.

use crate::models::{CandidateImage, CandidateImages, ImageUrls, LocalePreference};

/// Position of the candidate's best matching entry in `locales`.
///
/// `None` means unranked; it sorts after every ranked candidate.
#[must_use]
pub fn locale_rank(image: &CandidateImage, locales: &LocalePreference) -> Option<usize> {
    locales
        .position(&image.full_tag())
        .or_else(|| locales.position(image.language_tag()))
}

/// Stable sort of `images` by locale rank, then vote average, then vote count.
#[must_use]
pub fn rank_images(images: Vec<CandidateImage>, locales: &LocalePreference) -> Vec<CandidateImage> {
    let mut keyed: Vec<(usize, CandidateImage)> = images
        .into_iter()
        .map(|image| (locale_rank(&image, locales).unwrap_or(usize::MAX), image))
        .collect();

    keyed.sort_by(|(rank_a, a), (rank_b, b)| {
        rank_a
            .cmp(rank_b)
            .then_with(|| b.vote_average.total_cmp(&a.vote_average))
            .then_with(|| b.vote_count.cmp(&a.vote_count))
    });

    keyed.into_iter().map(|(_, image)| image).collect()
}

/// URL of the top ranked candidate, if any.
#[must_use]
pub fn select_best(images: Vec<CandidateImage>, locales: &LocalePreference) -> Option<String> {
    rank_images(images, locales)
        .into_iter()
        .map(|image| image.url)
        .find(|url| !url.is_empty())
}

/// Pick one image per slot from a provider's candidates.
#[must_use]
pub fn select_images(candidates: CandidateImages, locales: &LocalePreference) -> ImageUrls {
    ImageUrls {
        poster: select_best(candidates.posters, locales),
        background: select_best(candidates.backdrops, locales),
        logo: select_best(candidates.logos, locales),
    }
}
