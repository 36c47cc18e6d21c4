//! In-memory record store with live queries
//!
//! The collection lives inside a `watch` channel: every mutation publishes a
//! new immutable collection, and each live query derives its filtered,
//! ordered snapshot from whatever collection is current. Receivers always
//! see a total snapshot, never a patch.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use clientmap_core::{
    ClientRecord, Error, RecordDraft, RecordId, RecordQuery, RecordStore, Result, SnapshotStream,
};
use futures::stream;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info};

use crate::SnapshotFile;

type Collection = Arc<Vec<ClientRecord>>;

pub struct InMemoryRecordStore {
    collection: watch::Sender<Collection>,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
    snapshot: Option<SnapshotFile>,
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::from_records(Vec::new(), None)
    }

    /// Open a store persisted to a JSON snapshot file
    ///
    /// # Errors
    /// - `Error::Store` if the file exists but is not a valid snapshot
    pub fn with_snapshot_file(path: impl Into<PathBuf>) -> Result<Self> {
        let snapshot = SnapshotFile::new(path);
        let records = snapshot.load()?;
        info!(
            "Loaded {} client records from {:?}",
            records.len(),
            snapshot.path()
        );
        Ok(Self::from_records(records, Some(snapshot)))
    }

    fn from_records(records: Vec<ClientRecord>, snapshot: Option<SnapshotFile>) -> Self {
        let (collection, _) = watch::channel(Arc::new(records));
        Self {
            collection,
            write_lock: Mutex::new(()),
            snapshot,
        }
    }

    /// Number of live queries currently attached
    pub fn subscriber_count(&self) -> usize {
        self.collection.receiver_count()
    }

    /// Number of records across all owners
    pub fn len(&self) -> usize {
        self.collection.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `mutate` to a copy of the collection, persist it, then publish.
    ///
    /// Nothing is published when `mutate` or persistence fails. The snapshot
    /// file is written on the blocking pool.
    async fn commit<T, F>(&self, mutate: F) -> Result<T>
    where
        T: Send,
        F: FnOnce(&mut Vec<ClientRecord>) -> Result<T> + Send,
    {
        let _guard = self.write_lock.lock().await;

        let mut next: Vec<ClientRecord> = self.collection.borrow().to_vec();
        let out = mutate(&mut next)?;
        let next = Arc::new(next);
        if let Some(snapshot) = &self.snapshot {
            let snapshot = snapshot.clone();
            let records = Arc::clone(&next);
            tokio::task::spawn_blocking(move || snapshot.save(&records))
                .await
                .map_err(|e| Error::Store(format!("Snapshot write task failed: {}", e)))??;
        }
        self.collection.send_replace(next);
        Ok(out)
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn add(&self, mut draft: RecordDraft) -> Result<RecordId> {
        draft.validate()?;
        let id = self.commit(|records| {
            // Creation timestamps are strictly increasing so newest-first
            // ordering matches insertion order.
            let mut created_at = Utc::now();
            if let Some(latest) = records.iter().map(|r| r.created_at).max() {
                if created_at <= latest {
                    created_at = latest + Duration::microseconds(1);
                }
            }
            let id = RecordId::generate();
            records.push(ClientRecord::from_draft(id.clone(), draft, created_at));
            Ok(id)
        })
        .await?;
        debug!(record_id = %id, "Added client record");
        Ok(id)
    }

    async fn update(&self, id: &RecordId, mut draft: RecordDraft) -> Result<()> {
        draft.validate()?;
        self.commit(|records| {
            let record = records
                .iter_mut()
                .find(|r| &r.id == id)
                .ok_or_else(|| Error::RecordNotFound(id.to_string()))?;
            record.overwrite(draft);
            Ok(())
        })
        .await?;
        debug!(record_id = %id, "Updated client record");
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        self.commit(|records| {
            let before = records.len();
            records.retain(|r| &r.id != id);
            if records.len() == before {
                return Err(Error::RecordNotFound(id.to_string()));
            }
            Ok(())
        })
        .await?;
        debug!(record_id = %id, "Deleted client record");
        Ok(())
    }

    async fn get(&self, id: &RecordId) -> Result<Option<ClientRecord>> {
        Ok(self
            .collection
            .borrow()
            .iter()
            .find(|r| &r.id == id)
            .cloned())
    }

    async fn watch(&self, query: RecordQuery) -> Result<SnapshotStream> {
        let mut receiver = self.collection.subscribe();
        // The first poll yields the current result set
        receiver.mark_changed();
        debug!(owner = ?query.owner, "Live query attached");

        let snapshots = stream::unfold(
            (receiver, query, None::<Vec<ClientRecord>>),
            |(mut receiver, query, mut last)| async move {
                loop {
                    receiver.changed().await.ok()?;
                    let snapshot = query.apply(receiver.borrow_and_update().iter());
                    // Writes outside this query's view do not produce a push
                    if last.as_ref() != Some(&snapshot) {
                        last = Some(snapshot.clone());
                        return Some((snapshot, (receiver, query, last)));
                    }
                }
            },
        );
        Ok(Box::new(Box::pin(snapshots)))
    }
}
