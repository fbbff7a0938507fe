//! Ordered locale preference list

use serde::{Deserialize, Serialize};

/// Default image locale order when the user has not chosen one.
pub const DEFAULT_IMAGE_LANGUAGES: [&str; 6] = ["zh-CN", "zh-TW", "zh-HK", "zh", "null", "en"];

/// Locale codes in priority order; earlier entries win.
///
/// Entries are either a bare language (`"zh"`), a `lang-COUNTRY` tag
/// (`"zh-CN"`) or `"null"` for images without a language tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalePreference(Vec<String>);

impl LocalePreference {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(codes.into_iter().map(Into::into).collect())
    }

    /// Index of the exact entry `tag`, if present.
    #[must_use]
    pub fn position(&self, tag: &str) -> Option<usize> {
        self.0.iter().position(|code| code == tag)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bare language codes in order, de-duplicated and comma-joined.
    ///
    /// This is the form upstream image APIs accept as a language filter.
    #[must_use]
    pub fn include_languages(&self) -> String {
        let mut languages: Vec<&str> = Vec::new();
        for code in &self.0 {
            let language = code.split('-').next().unwrap_or(code);
            if !language.is_empty() && !languages.contains(&language) {
                languages.push(language);
            }
        }
        languages.join(",")
    }
}

impl Default for LocalePreference {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_LANGUAGES)
    }
}
