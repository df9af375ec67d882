//! JSON collection persistence on top of a [`KeyValueStore`].

use super::{KeyValueStore, StorageError, StorageResult};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Storage key for the marker collection.
pub const MARKERS_KEY: &str = "markers";

/// Storage key for the saved polygon collection.
pub const POLYGONS_KEY: &str = "polygons";

/// Loads and saves whole collections as JSON arrays.
///
/// Reads never fail: missing, corrupt or non-array data comes back as an
/// empty collection. Writes of an empty collection remove the key, so an
/// absent key and an empty collection are the same thing on reload.
#[derive(Debug)]
pub struct PersistenceAdapter<S: KeyValueStore> {
    storage: S,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Load the collection stored under `key`.
    ///
    /// Entries that fail to decode are skipped individually.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::error!("Failed to read '{}' from storage: {}", key, e);
                return Vec::new();
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to parse '{}' from storage: {}", key, e);
                return Vec::new();
            }
        };

        let serde_json::Value::Array(entries) = value else {
            log::warn!("Stored '{}' is not an array, ignoring it", key);
            return Vec::new();
        };

        let total = entries.len();
        let items: Vec<T> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(i, entry)| match serde_json::from_value(entry) {
                Ok(item) => Some(item),
                Err(e) => {
                    log::warn!("Skipping malformed '{}' entry {}: {}", key, i, e);
                    None
                }
            })
            .collect();

        log::info!("Loaded {}/{} '{}' entries", items.len(), total, key);
        items
    }

    /// Save `items` under `key`, or remove the key when `items` is empty.
    pub fn save<T: Serialize>(&self, key: &str, items: &[T]) -> StorageResult<()> {
        if items.is_empty() {
            log::debug!("Removing empty '{}' from storage", key);
            return self.storage.remove(key);
        }

        let json = serde_json::to_string(items)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.set(key, &json)
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{GeoPoint, Marker, Polygon};
    use crate::storage::MemoryStorage;

    fn marker(id: u64) -> Marker {
        Marker {
            id,
            longitude: 100.5,
            latitude: 13.7,
            title: format!("Marker {}", id),
            image: "https://example.com/a.png".to_string(),
        }
    }

    #[test]
    fn test_save_then_load_is_identity() {
        let adapter = PersistenceAdapter::new(MemoryStorage::new());
        let markers = vec![marker(1), marker(2)];

        adapter.save(MARKERS_KEY, &markers).unwrap();
        let loaded: Vec<Marker> = adapter.load(MARKERS_KEY);

        assert_eq!(loaded, markers);
    }

    #[test]
    fn test_save_empty_removes_key() {
        let adapter = PersistenceAdapter::new(MemoryStorage::new());
        adapter.save(MARKERS_KEY, &[marker(1)]).unwrap();
        adapter.save::<Marker>(MARKERS_KEY, &[]).unwrap();

        assert!(!adapter.storage().contains(MARKERS_KEY).unwrap());
        assert!(adapter.load::<Marker>(MARKERS_KEY).is_empty());
    }

    #[test]
    fn test_load_missing_key_is_empty() {
        let adapter = PersistenceAdapter::new(MemoryStorage::new());
        assert!(adapter.load::<Marker>(MARKERS_KEY).is_empty());
    }

    #[test]
    fn test_load_corrupt_json_is_empty() {
        let storage = MemoryStorage::new();
        storage.set(MARKERS_KEY, "{not json").unwrap();
        let adapter = PersistenceAdapter::new(storage);

        assert!(adapter.load::<Marker>(MARKERS_KEY).is_empty());
    }

    #[test]
    fn test_load_non_array_is_empty() {
        let storage = MemoryStorage::new();
        storage
            .set(MARKERS_KEY, r#"{"id":1,"longitude":0,"latitude":0,"title":"","image":""}"#)
            .unwrap();
        let adapter = PersistenceAdapter::new(storage);

        assert!(adapter.load::<Marker>(MARKERS_KEY).is_empty());
    }

    #[test]
    fn test_load_skips_malformed_entries() {
        let storage = MemoryStorage::new();
        storage
            .set(
                POLYGONS_KEY,
                r#"[
                    [{"longitude":0,"latitude":0},{"longitude":1,"latitude":0},{"longitude":1,"latitude":1}],
                    [{"longitude":0,"latitude":0}],
                    "garbage"
                ]"#,
            )
            .unwrap();
        let adapter = PersistenceAdapter::new(storage);

        let polygons: Vec<Polygon> = adapter.load(POLYGONS_KEY);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].points()[2], GeoPoint::new(1.0, 1.0));
    }
}
