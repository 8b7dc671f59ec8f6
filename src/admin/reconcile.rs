use std::sync::Arc;

use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    notice::Notice,
    settings::SettingsStore,
    store::{ApplicationStore, StoreChange, Subscription, APPLICATIONS_KEY, SETTINGS_KEY},
};

use super::state::ConsoleState;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Keeps the admin snapshot in step with writes from other contexts: every
/// change notification triggers a reload, and each poll tick reloads and
/// swaps the snapshot in only when the record count drifted.
pub(crate) async fn reconcile_loop(
    store: ApplicationStore,
    settings: Arc<SettingsStore>,
    state: Arc<ConsoleState>,
    mut subscription: Subscription,
    poll_interval: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut notifications_open = true;

    loop {
        tokio::select! {
            change = subscription.recv(), if notifications_open => {
                match change {
                    Some(change) => apply_change(&store, &settings, &state, change).await,
                    None => {
                        log_warn!("change bus closed, falling back to polling only");
                        notifications_open = false;
                    }
                }
            }
            _ = ticker.tick() => poll(&store, &state).await,
            _ = cancel_token.cancelled() => {
                log_info!("reconcile loop shutting down");
                break;
            }
        }
    }

    subscription.unsubscribe();
}

async fn apply_change(
    store: &ApplicationStore,
    settings: &SettingsStore,
    state: &ConsoleState,
    change: StoreChange,
) {
    match change.key.as_str() {
        APPLICATIONS_KEY => match store.load_revision().await {
            Ok((records, revision)) => {
                let count = records.len();
                match state.replace(records, revision) {
                    Some(previous) => {
                        log_info!(
                            "applications changed in context {}, reloaded {} records at revision {}",
                            change.origin,
                            count,
                            revision
                        );
                        if count > previous {
                            state.show(Notice::success("New application received!"));
                        }
                    }
                    None => log_info!("dropped stale reload at revision {}", revision),
                }
            }
            Err(err) => log_error!("failed to reload applications after change: {err}"),
        },
        SETTINGS_KEY => {
            if let Err(err) = settings.reload().await {
                log_error!("failed to reload settings after change: {err}");
            }
        }
        other => log_warn!("ignoring change to unknown key {other}"),
    }
}

async fn poll(store: &ApplicationStore, state: &ConsoleState) {
    match store.load_revision().await {
        Ok((records, revision)) if records.len() != state.len() => {
            let count = records.len();
            if let Some(previous) = state.replace(records, revision) {
                log_info!("poll detected drift ({} -> {} records), snapshot replaced", previous, count);
            }
        }
        Ok(_) => {}
        Err(err) => log_error!("poll failed to read applications: {err}"),
    }
}
