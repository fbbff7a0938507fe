pub mod fetch_cache;
pub mod keys;

pub use fetch_cache::{CacheError, FetchCache, Validate};
