// Image Provider Configuration
//
// Users pick providers and their order; each entry is stored as
// `{ "provider": "tmdb", "extra": { ... } }`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ProviderError;
use crate::models::LocalePreference;

/// Supported image sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Douban,
    Fanart,
    Tmdb,
}

impl ProviderKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Douban => "douban",
            Self::Fanart => "fanart",
            Self::Tmdb => "tmdb",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for the Douban (direct source) provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoubanExtra {
    /// Proxy template applied to every Douban image URL
    #[serde(default, alias = "proxytemplate", skip_serializing_if = "Option::is_none")]
    pub proxy_template: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanartExtra {
    /// Personal key, lifts the embargo on recent images
    #[serde(default, alias = "apikey", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TmdbExtra {
    /// Personal read access token; the shared default is used when absent
    #[serde(default, alias = "apikey", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, alias = "imagelanguages", skip_serializing_if = "Option::is_none")]
    pub image_languages: Option<LocalePreference>,
}

/// One configured image provider
///
/// A closed set: unknown provider names are rejected at deserialization time
/// instead of being silently skipped per request. The lowercase aliases on
/// the extras accept keys from case-folding configuration sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProviderConfig", into = "RawProviderConfig")]
pub enum ImageProviderConfig {
    Douban(DoubanExtra),
    Fanart(FanartExtra),
    Tmdb(TmdbExtra),
}

impl ImageProviderConfig {
    #[must_use]
    pub const fn kind(&self) -> ProviderKind {
        match self {
            Self::Douban(_) => ProviderKind::Douban,
            Self::Fanart(_) => ProviderKind::Fanart,
            Self::Tmdb(_) => ProviderKind::Tmdb,
        }
    }

    /// Provider with no extra options.
    #[must_use]
    pub fn bare(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::Douban => Self::Douban(DoubanExtra::default()),
            ProviderKind::Fanart => Self::Fanart(FanartExtra::default()),
            ProviderKind::Tmdb => Self::Tmdb(TmdbExtra::default()),
        }
    }
}

/// Wire shape of [`ImageProviderConfig`]; `extra` may be omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawProviderConfig {
    provider: ProviderKind,
    #[serde(default)]
    extra: Value,
}

impl TryFrom<RawProviderConfig> for ImageProviderConfig {
    type Error = ProviderError;

    fn try_from(raw: RawProviderConfig) -> Result<Self, Self::Error> {
        if raw.extra.is_null() {
            return Ok(Self::bare(raw.provider));
        }

        let config = match raw.provider {
            ProviderKind::Douban => Self::Douban(serde_json::from_value(raw.extra)?),
            ProviderKind::Fanart => Self::Fanart(serde_json::from_value(raw.extra)?),
            ProviderKind::Tmdb => Self::Tmdb(serde_json::from_value(raw.extra)?),
        };
        Ok(config)
    }
}

impl From<ImageProviderConfig> for RawProviderConfig {
    fn from(config: ImageProviderConfig) -> Self {
        let provider = config.kind();
        let extra = match config {
            ImageProviderConfig::Douban(extra) => serde_json::to_value(extra),
            ImageProviderConfig::Fanart(extra) => serde_json::to_value(extra),
            ImageProviderConfig::Tmdb(extra) => serde_json::to_value(extra),
        }
        .unwrap_or(Value::Null);

        Self { provider, extra }
    }
}

/// Per-user image settings, as kept by the user configuration store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserImageConfig {
    /// Providers in priority order; `None` means the deployment default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_providers: Option<Vec<ImageProviderConfig>>,
}
