use std::sync::{Mutex, PoisonError, RwLock};

use tokio::sync::watch;

use crate::{
    models::ApplicationRecord,
    notice::Notice,
    store::{derive_stats, ApplicationStats},
};

/// What the admin page currently shows: a derived copy of the collection,
/// its statistics and the latest notice. Never the source of truth.
pub(crate) struct ConsoleState {
    snapshot: RwLock<Snapshot>,
    stats: watch::Sender<ApplicationStats>,
    notice: Mutex<Option<Notice>>,
}

struct Snapshot {
    records: Vec<ApplicationRecord>,
    /// Storage revision `records` was read at.
    revision: i64,
}

impl ConsoleState {
    pub fn new(records: Vec<ApplicationRecord>, revision: i64) -> Self {
        let (stats, _) = watch::channel(derive_stats(&records));
        Self {
            snapshot: RwLock::new(Snapshot { records, revision }),
            stats,
            notice: Mutex::new(None),
        }
    }

    pub fn records(&self) -> Vec<ApplicationRecord> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .len()
    }

    /// Swap in a collection read at `revision` and republish its statistics.
    /// A read older than the current snapshot is dropped and `None` returned;
    /// otherwise returns the previous record count.
    pub fn replace(&self, records: Vec<ApplicationRecord>, revision: i64) -> Option<usize> {
        let mut guard = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        if revision < guard.revision {
            return None;
        }
        let stats = derive_stats(&records);
        let previous = std::mem::replace(&mut guard.records, records).len();
        guard.revision = revision;
        self.stats.send_replace(stats);
        Some(previous)
    }

    pub fn stats(&self) -> ApplicationStats {
        *self.stats.borrow()
    }

    pub fn subscribe_stats(&self) -> watch::Receiver<ApplicationStats> {
        self.stats.subscribe()
    }

    /// A newer notice always replaces the older one.
    pub fn show(&self, notice: Notice) {
        *self.notice.lock().unwrap_or_else(PoisonError::into_inner) = Some(notice);
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear_notice(&self) {
        *self.notice.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
