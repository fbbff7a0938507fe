//! Metadata enrichment core for Douban catalog subjects
//!
//! Resolves poster, background and logo artwork for a subject by querying
//! image providers (Fanart.tv, TMDB, Douban itself) in a user-defined
//! priority order, ranking each provider's candidates by locale preference
//! and popularity. Every outbound call goes through a validating, coalescing
//! cache.

pub mod api;
pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod image;
pub mod logging;
pub mod mapping;
pub mod models;
pub mod provider;
pub mod template;

pub use config::Config;
pub use error::{Error, Result};
