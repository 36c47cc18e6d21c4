//! Live record list adapter
//!
//! Mirrors one live query into a local list. Each pushed snapshot replaces
//! the list wholesale; readers never see a partially applied push.

use clientmap_core::{ClientRecord, RecordQuery, RecordStore, Result};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

pub type RecordList = Arc<Vec<ClientRecord>>;

/// Local mirror of a live query.
///
/// The subscription is released on `unsubscribe` or drop.
pub struct LiveRecordList {
    current: watch::Receiver<Option<RecordList>>,
    task: Option<JoinHandle<()>>,
}

impl LiveRecordList {
    /// Attach to `store` and start mirroring `query`
    pub async fn subscribe(store: &dyn RecordStore, query: RecordQuery) -> Result<Self> {
        let mut snapshots = store.watch(query).await?;
        let (sender, current) = watch::channel(None);

        let task = tokio::spawn(async move {
            while let Some(snapshot) = snapshots.next().await {
                debug!("Live list replaced with {} records", snapshot.len());
                sender.send_replace(Some(Arc::new(snapshot)));
            }
            debug!("Live query closed by the store");
        });

        Ok(Self {
            current,
            task: Some(task),
        })
    }

    /// The most recent snapshot, empty before the first push
    pub fn records(&self) -> RecordList {
        self.current.borrow().clone().unwrap_or_default()
    }

    /// Whether the first snapshot has arrived
    pub fn is_loaded(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Receiver notified on every replacement
    pub fn changes(&self) -> watch::Receiver<Option<RecordList>> {
        self.current.clone()
    }

    /// Wait for the next snapshot. Returns `None` once the list is closed.
    pub async fn next_snapshot(&mut self) -> Option<RecordList> {
        self.current.changed().await.ok()?;
        self.current.borrow_and_update().clone()
    }

    /// Whether the list is still attached to its live query
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop receiving pushes. The last snapshot stays readable.
    pub fn unsubscribe(&mut self) {
        if let Some(task) = self.task.take() {
            debug!("Detaching live record list");
            task.abort();
        }
    }
}

impl Drop for LiveRecordList {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
