use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::LocalePreference;
use crate::provider::{ImageProviderConfig, ProviderKind};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub http: HttpConfig,
    pub cache: CacheConfig,
    pub douban: DoubanConfig,
    pub tmdb: TmdbConfig,
    pub fanart: FanartConfig,
    pub images: ImagesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 15,
            connect_timeout_seconds: 5,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36 MicroMessenger/7.0.20.1781(0x6700143B) NetType/WIFI MiniProgramEnv/Mac MacWechat/WMPF".to_string(),
        }
    }
}

/// Bounds of one provider cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    pub max_capacity: u64,
    pub ttl_seconds: u64,
}

impl CacheSettings {
    #[must_use]
    pub const fn new(max_capacity: u64, ttl_seconds: u64) -> Self {
        Self {
            max_capacity,
            ttl_seconds,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub douban_detail: CacheSettings,
    pub douban_collection: CacheSettings,
    pub tmdb_images: CacheSettings,
    pub fanart_images: CacheSettings,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            douban_detail: CacheSettings::new(500, 24 * 60 * 60),
            douban_collection: CacheSettings::new(500, 2 * 60 * 60),
            tmdb_images: CacheSettings::new(1000, 24 * 60 * 60),
            fanart_images: CacheSettings::new(1000, 24 * 60 * 60),
        }
    }
}

impl CacheConfig {
    fn named(&self) -> [(&'static str, &CacheSettings); 4] {
        [
            ("douban_detail", &self.douban_detail),
            ("douban_collection", &self.douban_collection),
            ("tmdb_images", &self.tmdb_images),
            ("fanart_images", &self.fanart_images),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DoubanConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub referer: String,
}

impl Default for DoubanConfig {
    fn default() -> Self {
        Self {
            base_url: "https://frodo.douban.com/api/v2".to_string(),
            api_key: None,
            referer: "https://servicewechat.com/wx2f9b06c1de1ccfca/99/page-frame.html".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    pub base_url: String,
    pub image_base_url: String,
    /// Shared read access token used when a user has none
    pub api_key: Option<String>,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org".to_string(),
            image_base_url: "https://image.tmdb.org/t/p/original".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FanartConfig {
    pub base_url: String,
    /// Project key
    pub api_key: Option<String>,
}

impl Default for FanartConfig {
    fn default() -> Self {
        Self {
            base_url: "https://webservice.fanart.tv".to_string(),
            api_key: None,
        }
    }
}

/// Artwork resolution defaults for users without their own settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub providers: Vec<ImageProviderConfig>,
    pub languages: LocalePreference,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            providers: [ProviderKind::Fanart, ProviderKind::Tmdb, ProviderKind::Douban]
                .into_iter()
                .map(ImageProviderConfig::bare)
                .collect(),
            languages: LocalePreference::default(),
        }
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // DOUBAN_META__TMDB__API_KEY, DOUBAN_META__LOGGING__LEVEL, ...
        builder = builder.add_source(
            Environment::with_prefix("DOUBAN_META")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// Check settings that deserialize fine but cannot work.
    ///
    /// Returns every problem found, not just the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            errors.push(format!(
                "logging.format must be \"json\" or \"pretty\", got {:?}",
                self.logging.format
            ));
        }

        if self.http.timeout_seconds == 0 {
            errors.push("http.timeout_seconds must be greater than 0".to_string());
        }

        for (name, settings) in self.cache.named() {
            if settings.max_capacity == 0 {
                errors.push(format!("cache.{name}.max_capacity must be greater than 0"));
            }
            if settings.ttl_seconds == 0 {
                errors.push(format!("cache.{name}.ttl_seconds must be greater than 0"));
            }
        }

        for (name, base_url) in [
            ("douban.base_url", &self.douban.base_url),
            ("tmdb.base_url", &self.tmdb.base_url),
            ("tmdb.image_base_url", &self.tmdb.image_base_url),
            ("fanart.base_url", &self.fanart.base_url),
        ] {
            if let Err(e) = url::Url::parse(base_url) {
                errors.push(format!("{name} is not a valid URL ({base_url:?}): {e}"));
            }
        }

        if self.images.providers.is_empty() {
            errors.push("images.providers must list at least one provider".to_string());
        }
        if self.images.languages.is_empty() {
            errors.push("images.languages must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
