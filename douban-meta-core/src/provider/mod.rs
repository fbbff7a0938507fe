// Image Provider System
//
// Each external image source sits behind the `ImageProvider` trait and is
// built from an `ImageProviderConfig` entry by the `ProviderFactory`.

pub mod config;
pub mod douban;
pub mod error;
pub mod factory;
pub mod fanart;
pub mod tmdb;
pub mod traits;

pub use config::{
    DoubanExtra, FanartExtra, ImageProviderConfig, ProviderKind, TmdbExtra, UserImageConfig,
};
pub use douban::DoubanImageProvider;
pub use error::ProviderError;
pub use factory::ProviderFactory;
pub use fanart::FanartImageProvider;
pub use tmdb::TmdbImageProvider;
pub use traits::ImageProvider;
