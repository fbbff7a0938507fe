//! ID mapping lookup
//!
//! Which external ids a Douban subject has decides which image providers can
//! be queried for it. Persistence is left to the embedding service; the
//! in-memory store backs the CLI and tests.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::models::IdMapping;
use crate::Result;

#[async_trait]
pub trait IdMappingStore: Send + Sync {
    async fn get(&self, douban_id: u64) -> Result<Option<IdMapping>>;

    /// Insert or replace the mapping for `mapping.douban_id`.
    ///
    /// A calibrated mapping is only replaced by another calibrated one.
    async fn upsert(&self, mapping: IdMapping) -> Result<()>;
}

/// Look up `douban_id`, recording an empty mapping for unseen subjects so
/// they show up for calibration.
pub async fn find_or_record(store: &dyn IdMappingStore, douban_id: u64) -> Result<IdMapping> {
    if let Some(mapping) = store.get(douban_id).await? {
        return Ok(mapping);
    }

    tracing::debug!(douban_id, "Recording empty id mapping");
    let mapping = IdMapping::empty(douban_id);
    store.upsert(mapping.clone()).await?;
    Ok(mapping)
}

#[derive(Debug, Default)]
pub struct InMemoryIdMappingStore {
    entries: DashMap<u64, IdMapping>,
}

impl InMemoryIdMappingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_mappings(mappings: impl IntoIterator<Item = IdMapping>) -> Self {
        let entries = mappings
            .into_iter()
            .map(|mapping| (mapping.douban_id, mapping))
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl IdMappingStore for InMemoryIdMappingStore {
    async fn get(&self, douban_id: u64) -> Result<Option<IdMapping>> {
        Ok(self.entries.get(&douban_id).map(|entry| entry.clone()))
    }

    async fn upsert(&self, mapping: IdMapping) -> Result<()> {
        match self.entries.entry(mapping.douban_id) {
            Entry::Occupied(mut existing) => {
                if existing.get().calibrated && !mapping.calibrated {
                    tracing::debug!(douban_id = mapping.douban_id, "Keeping calibrated id mapping");
                } else {
                    existing.insert(mapping);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(mapping);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_subject_is_recorded() {
        let store = InMemoryIdMappingStore::new();
        let mapping = find_or_record(&store, 1292052).await.unwrap();

        assert_eq!(mapping, IdMapping::empty(1292052));
        assert_eq!(store.len(), 1);
        assert!(mapping.external_ids().tmdb_id.is_none());
    }

    #[tokio::test]
    async fn test_known_subject_is_returned() {
        let store = InMemoryIdMappingStore::with_mappings([IdMapping {
            douban_id: 1292052,
            tmdb_id: Some(278),
            imdb_id: Some("tt0111161".to_string()),
            ..IdMapping::default()
        }]);

        let ids = find_or_record(&store, 1292052).await.unwrap().external_ids();
        assert_eq!(ids.tmdb_id, Some(278));
        assert_eq!(ids.imdb(), Some("tt0111161"));
    }

    #[tokio::test]
    async fn test_calibrated_mapping_is_not_overwritten() {
        let calibrated = IdMapping {
            douban_id: 1,
            tmdb_id: Some(10),
            calibrated: true,
            ..IdMapping::default()
        };
        let store = InMemoryIdMappingStore::with_mappings([calibrated.clone()]);

        store
            .upsert(IdMapping {
                douban_id: 1,
                tmdb_id: Some(99),
                ..IdMapping::default()
            })
            .await
            .unwrap();
        assert_eq!(store.get(1).await.unwrap(), Some(calibrated));

        let recalibrated = IdMapping {
            douban_id: 1,
            tmdb_id: Some(11),
            calibrated: true,
            ..IdMapping::default()
        };
        store.upsert(recalibrated.clone()).await.unwrap();
        assert_eq!(store.get(1).await.unwrap(), Some(recalibrated));
    }
}
