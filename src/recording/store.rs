//! Process-wide recording store
//!
//! Completed recordings are keyed by id and outlive the sessions that
//! produced them, subject to the retention sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::record::RecordingRecord;

/// Store for completed recordings
///
/// Thread-safe via `RwLock`; reads (queries) dominate writes (one insert per
/// completed capture).
#[derive(Debug, Default)]
pub struct RecordingStore {
    records: RwLock<HashMap<Uuid, Arc<RecordingRecord>>>,
}

impl RecordingStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist a completed recording
    pub async fn insert(&self, record: RecordingRecord) -> Arc<RecordingRecord> {
        let record = Arc::new(record);
        let mut records = self.records.write().await;
        records.insert(record.id, Arc::clone(&record));

        tracing::info!(
            recording = %record.id,
            session = %record.session_id,
            events = record.events.len(),
            duration_ms = record.duration_ms,
            "Recording stored"
        );

        record
    }

    /// Look up a recording by id
    pub async fn get(&self, id: Uuid) -> Option<Arc<RecordingRecord>> {
        self.records.read().await.get(&id).cloned()
    }

    /// Number of stored recordings
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Remove recordings whose capture stopped longer than `retention` ago
    ///
    /// Returns the number of recordings removed. Safe to run concurrently
    /// with inserts and queries.
    pub async fn cleanup(&self, retention: Duration) -> usize {
        let mut records = self.records.write().await;
        let now = Utc::now();

        let expired: Vec<Uuid> = records
            .values()
            .filter(|record| {
                let age = (now - record.stopped_at).to_std().unwrap_or_default();
                age > retention
            })
            .map(|record| record.id)
            .collect();

        for id in &expired {
            records.remove(id);
            tracing::info!(recording = %id, "Recording removed by cleanup");
        }

        expired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingCapsule;

    async fn stored(store: &RecordingStore) -> Arc<RecordingRecord> {
        let mut capsule = RecordingCapsule::new();
        capsule.start("host").unwrap();
        capsule.append("whiteboard-draw", serde_json::json!({}));
        let record = capsule.stop("s1", Vec::new()).unwrap();
        store.insert(record).await
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = RecordingStore::new();
        let record = stored(&store).await;

        let found = store.get(record.id).await.unwrap();
        assert_eq!(found.id, record.id);
        assert_eq!(found.events.len(), 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_is_none() {
        let store = RecordingStore::new();
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_cleanup_respects_retention() {
        let store = RecordingStore::new();
        let record = stored(&store).await;

        // Fresh record survives a generous retention window
        assert_eq!(store.cleanup(Duration::from_secs(3600)).await, 0);
        assert!(store.get(record.id).await.is_some());

        // Zero retention removes everything already stopped
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(store.cleanup(Duration::ZERO).await, 1);
        assert!(store.get(record.id).await.is_none());
        assert!(store.is_empty().await);
    }
}
