//! The record store: single source of truth for application records.
//!
//! The whole collection is one JSON blob under [`APPLICATIONS_KEY`]. Every
//! mutation reloads it, edits the copy and writes the whole thing back, so two
//! contexts writing concurrently resolve as last-writer-wins.

pub mod changes;
pub mod stats;
mod transitions;

use anyhow::Context;
use chrono::Utc;
use log::{error, info, warn};
use uuid::Uuid;

use crate::{
    db::Database,
    error::{StoreError, StoreResult},
    models::ApplicationRecord,
};

pub use changes::{ChangeBus, StoreChange, Subscription, APPLICATIONS_KEY, SETTINGS_KEY};
pub use stats::{derive_stats, ApplicationStats};
pub use transitions::DEFAULT_RETENTION_DAYS;

/// Storage shared by every page of one origin: the key-value database plus
/// the bus that tells other pages a blob changed.
#[derive(Clone)]
pub struct SharedStorage {
    db: Database,
    changes: ChangeBus,
}

impl SharedStorage {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            changes: ChangeBus::default(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn changes(&self) -> &ChangeBus {
        &self.changes
    }

    /// Persist `value` under `key` and notify the other contexts.
    pub async fn write(&self, origin: Uuid, key: &str, value: String) -> StoreResult<()> {
        self.db.put_value(key, value.clone()).await?;
        self.changes.publish(StoreChange {
            key: key.to_string(),
            new_value: value,
            origin,
            timestamp: Utc::now(),
        });
        Ok(())
    }
}

/// Linear lookup by `studentId`.
pub fn find_by_id<'a>(records: &'a [ApplicationRecord], id: &str) -> Option<&'a ApplicationRecord> {
    records.iter().find(|record| record.student_id == id)
}

/// Remove the record with `studentId == id`, preserving the order of the rest.
pub fn remove_by_id(records: &mut Vec<ApplicationRecord>, id: &str) -> Option<ApplicationRecord> {
    let index = records.iter().position(|record| record.student_id == id)?;
    Some(records.remove(index))
}

/// Decode a persisted collection. Unreadable data is treated as empty.
fn decode_collection(raw: &str) -> Vec<ApplicationRecord> {
    match serde_json::from_str(raw) {
        Ok(records) => records,
        Err(err) => {
            warn!("Persisted applications are unreadable, treating as empty: {err}");
            Vec::new()
        }
    }
}

/// One page context's handle on the record store.
#[derive(Clone)]
pub struct ApplicationStore {
    storage: SharedStorage,
    context_id: Uuid,
}

impl ApplicationStore {
    pub fn new(storage: SharedStorage) -> Self {
        Self {
            storage,
            context_id: Uuid::new_v4(),
        }
    }

    pub fn context_id(&self) -> Uuid {
        self.context_id
    }

    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    /// Subscribe to collection and settings writes made by other contexts.
    pub fn subscribe(&self) -> Subscription {
        self.storage.changes.subscribe(self.context_id)
    }

    /// Current persisted collection. Never fails: storage errors and corrupt
    /// data both read as an empty collection.
    pub async fn load(&self) -> Vec<ApplicationRecord> {
        match self.try_load().await {
            Ok(records) => records,
            Err(err) => {
                error!("Failed to read applications: {err}");
                Vec::new()
            }
        }
    }

    /// Like [`load`](Self::load) but reports storage failures so that a
    /// mutation never overwrites data it could not read.
    pub(crate) async fn try_load(&self) -> StoreResult<Vec<ApplicationRecord>> {
        let raw = self.storage.db.get_value(APPLICATIONS_KEY).await?;
        Ok(raw.as_deref().map(decode_collection).unwrap_or_default())
    }

    /// The collection together with the storage revision it was read at.
    /// Revision 0 means nothing has been written yet.
    pub(crate) async fn load_revision(&self) -> StoreResult<(Vec<ApplicationRecord>, i64)> {
        let entry = self.storage.db.get_entry(APPLICATIONS_KEY).await?;
        Ok(match entry {
            Some(entry) => (decode_collection(&entry.value), entry.revision),
            None => (Vec::new(), 0),
        })
    }

    /// Replace the persisted collection with `records`.
    pub async fn save_all(&self, records: &[ApplicationRecord]) -> StoreResult<()> {
        let serialized =
            serde_json::to_string(records).context("failed to serialize applications")?;
        self.storage
            .write(self.context_id, APPLICATIONS_KEY, serialized)
            .await
    }

    /// Read-modify-write of the whole collection. Nothing is written when `f`
    /// fails.
    pub(crate) async fn mutate<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Vec<ApplicationRecord>) -> StoreResult<T>,
    {
        let mut records = self.try_load().await?;
        let output = f(&mut records)?;
        self.save_all(&records).await?;
        Ok(output)
    }

    pub async fn append(&self, record: ApplicationRecord) -> StoreResult<()> {
        let student_id = record.student_id.clone();
        self.mutate(move |records| {
            if find_by_id(records, &record.student_id).is_some() {
                return Err(StoreError::DuplicateId(record.student_id));
            }
            records.push(record);
            Ok(())
        })
        .await?;
        info!("Stored application {student_id}");
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> StoreResult<ApplicationRecord> {
        let records = self.try_load().await?;
        find_by_id(&records, id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Delete a record regardless of its status.
    pub async fn remove_by_id(&self, id: &str) -> StoreResult<ApplicationRecord> {
        let removed = self
            .mutate(|records| {
                remove_by_id(records, id).ok_or_else(|| StoreError::NotFound(id.to_string()))
            })
            .await?;
        info!("Deleted application {id}");
        Ok(removed)
    }

    /// Drop every record. Returns how many were removed.
    pub async fn clear(&self) -> StoreResult<usize> {
        let removed = self
            .mutate(|records| {
                let count = records.len();
                records.clear();
                Ok(count)
            })
            .await?;
        warn!("Cleared all {removed} applications");
        Ok(removed)
    }

    pub async fn stats(&self) -> ApplicationStats {
        derive_stats(&self.load().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::fixtures::record;

    fn store() -> ApplicationStore {
        let db = Database::open_in_memory().unwrap();
        ApplicationStore::new(SharedStorage::new(db))
    }

    #[tokio::test]
    async fn load_of_empty_storage_is_empty() {
        assert!(store().load().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_blob_reads_as_empty() {
        let store = store();
        for raw in ["{not json", "{\"studentId\":\"NS1\"}", "[{\"studentId\":1}]"] {
            store
                .storage()
                .database()
                .put_value(APPLICATIONS_KEY, raw.into())
                .await
                .unwrap();
            assert!(store.load().await.is_empty(), "{raw} should read as empty");
        }
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = store();
        let records = vec![record("NS1", Utc::now()), record("NS2", Utc::now())];

        store.save_all(&records).await.unwrap();
        let loaded = store.load().await;
        assert_eq!(loaded, records);

        store.save_all(&loaded).await.unwrap();
        assert_eq!(store.load().await, records);
    }

    #[tokio::test]
    async fn append_preserves_order_and_rejects_duplicates() {
        let store = store();
        store.append(record("NS1", Utc::now())).await.unwrap();
        store.append(record("NS2", Utc::now())).await.unwrap();

        let err = store.append(record("NS1", Utc::now())).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(id) if id == "NS1"));

        let ids: Vec<_> = store
            .load()
            .await
            .into_iter()
            .map(|r| r.student_id)
            .collect();
        assert_eq!(ids, vec!["NS1", "NS2"]);
    }

    #[tokio::test]
    async fn find_and_remove_by_id() {
        let store = store();
        store.append(record("NS1", Utc::now())).await.unwrap();

        assert_eq!(store.find_by_id("NS1").await.unwrap().student_id, "NS1");
        assert!(matches!(
            store.find_by_id("NS9").await,
            Err(StoreError::NotFound(_))
        ));

        store.remove_by_id("NS1").await.unwrap();
        assert!(store.load().await.is_empty());
        assert!(matches!(
            store.remove_by_id("NS1").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn failed_mutation_writes_nothing() {
        let store = store();
        let mut sub = store.storage().changes().subscribe(Uuid::new_v4());

        let result: StoreResult<()> = store
            .mutate(|records| {
                records.push(record("NS1", Utc::now()));
                Err(StoreError::validation("nope"))
            })
            .await;

        assert!(result.is_err());
        assert!(store.load().await.is_empty());
        let waited =
            tokio::time::timeout(std::time::Duration::from_millis(30), sub.recv()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn save_notifies_other_contexts_only() {
        let storage = SharedStorage::new(Database::open_in_memory().unwrap());
        let writer = ApplicationStore::new(storage.clone());
        let reader = ApplicationStore::new(storage);
        let mut reader_sub = reader.subscribe();

        writer.append(record("NS1", Utc::now())).await.unwrap();

        let change = reader_sub.recv().await.unwrap();
        assert_eq!(change.key, APPLICATIONS_KEY);
        assert_eq!(change.origin, writer.context_id());
    }

    #[tokio::test]
    async fn every_save_advances_the_revision() {
        let store = store();
        assert_eq!(store.load_revision().await.unwrap(), (Vec::new(), 0));

        store.append(record("NS1", Utc::now())).await.unwrap();
        let (records, first) = store.load_revision().await.unwrap();
        assert_eq!(records.len(), 1);

        store.approve("NS1").await.unwrap();
        let (records, second) = store.load_revision().await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(second > first);
    }

    #[tokio::test]
    async fn clear_reports_removed_count() {
        let store = store();
        store.append(record("NS1", Utc::now())).await.unwrap();
        store.append(record("NS2", Utc::now())).await.unwrap();

        assert_eq!(store.clear().await.unwrap(), 2);
        assert_eq!(store.stats().await.total, 0);
    }
}
