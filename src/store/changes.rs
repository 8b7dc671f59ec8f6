//! Change notifications between page contexts sharing one storage.
//!
//! A context publishes a [`StoreChange`] every time it persists a blob. Other
//! contexts treat it as a hint to reload; the payload is informational only.

use chrono::{DateTime, Utc};
use log::warn;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Key of the persisted application collection.
pub const APPLICATIONS_KEY: &str = "applications";

/// Key of the persisted admin settings.
pub const SETTINGS_KEY: &str = "settings";

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct StoreChange {
    pub key: String,
    pub new_value: String,
    /// Context that performed the write.
    pub origin: Uuid,
    pub timestamp: DateTime<Utc>,
}

/// Fan-out bus carrying [`StoreChange`]s to every subscribed context.
#[derive(Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<StoreChange>,
}

impl ChangeBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, change: StoreChange) {
        // Only fails when nobody is listening.
        let _ = self.sender.send(change);
    }

    /// Subscribe on behalf of `context`. Changes that context published
    /// itself are never delivered back to it.
    pub fn subscribe(&self, context: Uuid) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            context,
        }
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Live subscription. Dropping it unsubscribes.
pub struct Subscription {
    receiver: broadcast::Receiver<StoreChange>,
    context: Uuid,
}

impl Subscription {
    /// Next change written by another context, or `None` once the bus is gone.
    ///
    /// Lagged notifications are skipped; the periodic reconciliation poll is
    /// what catches anything dropped here.
    pub async fn recv(&mut self) -> Option<StoreChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) if change.origin == self.context => continue,
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!("Change subscription lagged; {missed} notifications dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}
}
