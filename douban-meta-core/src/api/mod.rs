//! Raw clients for the upstream metadata APIs
//!
//! Each client issues its calls through the shared [`HttpClient`], stores the
//! decoded payload in its own [`FetchCache`](crate::cache::FetchCache) and
//! normalises it into the crate's canonical shapes.

pub mod douban;
pub mod fanart;
pub mod tmdb;

pub use douban::{CollectionItem, DoubanApi, SubjectCollection, SubjectDetail};
pub use fanart::{FanartApi, FanartImages};
pub use tmdb::{TmdbApi, TmdbImages};

use serde_json::Value;

use crate::http::HttpError;

/// Treat an upstream 404 as "no data" rather than a failure.
///
/// A `null` payload is never cached, so the subject is looked up again on the
/// next request.
pub(crate) fn not_found_as_null(result: Result<Value, HttpError>) -> Result<Value, HttpError> {
    match result {
        Err(e) if e.is_not_found() => Ok(Value::Null),
        other => other,
    }
}

/// Strip trailing slashes so paths can be appended with `format!`.
pub(crate) fn trim_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Blank credentials count as absent.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
