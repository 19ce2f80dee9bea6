// # Key-Value Obstacle Store
//
// ObstacleStore over any KeyValueStore: the whole collection is one JSON
// array stored under a single fixed key.

use async_trait::async_trait;

use crate::Error;
use crate::model::{Obstacle, StoredObstacle};
use crate::traits::{KeyValueStore, ObstacleStore};

/// Key holding the serialized collection
pub const OBSTACLES_KEY: &str = "obstacles";

/// Obstacle store persisting to a key-value substrate
///
/// # Example
///
/// ```rust
/// use obstacle_core::state::{KvObstacleStore, MemoryKeyValueStore};
/// use obstacle_core::traits::ObstacleStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = KvObstacleStore::new(MemoryKeyValueStore::new());
///     assert!(store.read_all().await?.is_empty());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct KvObstacleStore<K> {
    substrate: K,
}

impl<K: KeyValueStore> KvObstacleStore<K> {
    /// Store the collection under [`OBSTACLES_KEY`]
    pub fn new(substrate: K) -> Self {
        Self { substrate }
    }
}

#[async_trait]
impl<K: KeyValueStore> ObstacleStore for KvObstacleStore<K> {
    async fn read_all(&self) -> Result<Vec<Obstacle>, Error> {
        let Some(blob) = self.substrate.get(OBSTACLES_KEY).await? else {
            tracing::debug!("No persisted obstacles under '{}'", OBSTACLES_KEY);
            return Ok(Vec::new());
        };

        let records: Vec<StoredObstacle> = serde_json::from_str(&blob).map_err(|e| {
            Error::storage_read(format!(
                "Failed to parse obstacles under '{}': {}",
                OBSTACLES_KEY, e
            ))
        })?;

        let blank = blank_record_ids(&records);
        if !blank.is_empty() {
            tracing::warn!(
                "{} stored obstacle(s) have an empty title or description: {}",
                blank.len(),
                blank.join(", ")
            );
        }

        tracing::debug!("Read {} obstacle(s)", records.len());
        Ok(records.into_iter().map(Obstacle::from).collect())
    }

    async fn write_all(&self, obstacles: &[Obstacle]) -> Result<(), Error> {
        let records: Vec<StoredObstacle> = obstacles.iter().map(StoredObstacle::from).collect();

        let blob = serde_json::to_string(&records)
            .map_err(|e| Error::storage_write(format!("Failed to serialize obstacles: {}", e)))?;

        self.substrate.set(OBSTACLES_KEY, &blob).await?;
        tracing::debug!("Wrote {} obstacle(s)", obstacles.len());
        Ok(())
    }
}

/// Ids of records that would fail creation-time validation
///
/// They are still loaded, since dropping them would lose data.
fn blank_record_ids(records: &[StoredObstacle]) -> Vec<&str> {
    records
        .iter()
        .filter(|r| r.title.trim().is_empty() || r.description.trim().is_empty())
        .map(|r| r.id.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coordinates, ImageRef, ObstacleId};
    use crate::state::MemoryKeyValueStore;

    fn obstacle(id: &str, title: &str, image: Option<&str>) -> Obstacle {
        Obstacle::new(
            ObstacleId::new(id),
            title.to_string(),
            format!("{title} description"),
            Coordinates::new(45.5, -73.6),
            image.map(ImageRef::new),
        )
    }

    #[tokio::test]
    async fn test_round_trip_preserves_order() {
        let store = KvObstacleStore::new(MemoryKeyValueStore::new());
        let collection = vec![
            obstacle("3", "Pole", None),
            obstacle("1", "Gate", Some("/media/gate.jpg")),
            obstacle("2", "Tree", None),
        ];

        store.write_all(&collection).await.unwrap();
        let read = store.read_all().await.unwrap();

        assert_eq!(read, collection);
    }

    #[tokio::test]
    async fn test_empty_when_never_written() {
        let store = KvObstacleStore::new(MemoryKeyValueStore::new());
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blob_is_plain_json_array() {
        let substrate = MemoryKeyValueStore::new();
        let store = KvObstacleStore::new(substrate.clone());

        store
            .write_all(&[obstacle("1", "Pole", None)])
            .await
            .unwrap();

        let blob = substrate.get(OBSTACLES_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
        let records = value.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["imageUri"], "");
        assert_eq!(records[0]["id"], "1");
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_read_failure() {
        let substrate = MemoryKeyValueStore::new();
        substrate.set(OBSTACLES_KEY, "not json").await.unwrap();

        let store = KvObstacleStore::new(substrate);
        let err = store.read_all().await.unwrap_err();
        assert!(matches!(err, Error::StorageRead(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_reads_legacy_blob() {
        let substrate = MemoryKeyValueStore::new();
        substrate
            .set(
                OBSTACLES_KEY,
                r#"[{"id":"1718035200000","title":"Pole","description":"Low cable","latitude":48.85,"longitude":2.35,"imageUri":"file:///photo.jpg"}]"#,
            )
            .await
            .unwrap();

        let store = KvObstacleStore::new(substrate);
        let read = store.read_all().await.unwrap();

        assert_eq!(read.len(), 1);
        assert_eq!(read[0].id().as_str(), "1718035200000");
        assert_eq!(read[0].position(), Coordinates::new(48.85, 2.35));
        assert_eq!(
            read[0].image().map(|i| i.to_string()).as_deref(),
            Some("file:///photo.jpg")
        );
    }

    #[tokio::test]
    async fn test_blank_records_are_loaded_and_reported() {
        let blob = r#"[
            {"id":"1","title":"","description":"Low cable","latitude":0,"longitude":0,"imageUri":""},
            {"id":"2","title":"Gate","description":"Locked","latitude":0,"longitude":0,"imageUri":""},
            {"id":"3","title":"Tree","description":"  ","latitude":0,"longitude":0,"imageUri":""}
        ]"#;
        let records: Vec<StoredObstacle> = serde_json::from_str(blob).unwrap();
        assert_eq!(blank_record_ids(&records), vec!["1", "3"]);

        let substrate = MemoryKeyValueStore::new();
        substrate.set(OBSTACLES_KEY, blob).await.unwrap();
        let read = KvObstacleStore::new(substrate).read_all().await.unwrap();
        assert_eq!(read.len(), 3);
    }
}
