use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::{task::JoinHandle, time::Duration};
use tokio_util::sync::CancellationToken;

use crate::{settings::SettingsStore, store::ApplicationStore};

use super::{reconcile::reconcile_loop, state::ConsoleState};

/// Owns the background reconciliation task of one admin console.
pub(crate) struct SyncController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl SyncController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn start(
        &mut self,
        store: ApplicationStore,
        settings: Arc<SettingsStore>,
        state: Arc<ConsoleState>,
        poll_interval: Duration,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("reconciliation already active");
        }

        let cancel_token = CancellationToken::new();
        let subscription = store.subscribe();
        let handle = tokio::spawn(reconcile_loop(
            store,
            settings,
            state,
            subscription,
            poll_interval,
            cancel_token.clone(),
        ));

        info!("Started reconciliation every {poll_interval:?}");
        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("reconciliation task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

impl Drop for SyncController {
    fn drop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
    }
}
