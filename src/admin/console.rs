use std::sync::Arc;

use chrono::Utc;
use log::{error, info};
use tokio::sync::{watch, Mutex};

use crate::{
    config::AppConfig,
    error::{StoreError, StoreResult},
    export::{self, CsvExport, ExportScope},
    models::{ApplicationRecord, ApplicationStatus},
    notice::Notice,
    query::{self, ApplicationQuery, RECENT_LIMIT},
    settings::{AdminSettings, SettingsStore},
    store::{ApplicationStats, ApplicationStore},
};

use super::{controller::SyncController, state::ConsoleState};

/// The admin page. Reads the shared store, runs transitions against it and
/// keeps a derived snapshot that follows writes made by other pages.
pub struct AdminConsole {
    store: ApplicationStore,
    settings: Arc<SettingsStore>,
    state: Arc<ConsoleState>,
    sync: Mutex<SyncController>,
    config: AppConfig,
}

impl AdminConsole {
    /// Load the current collection and settings and start reconciling.
    pub async fn open(store: ApplicationStore, config: AppConfig) -> StoreResult<Self> {
        let settings = Arc::new(SettingsStore::load(store.storage().clone(), store.context_id()).await?);
        let (records, revision) = store.load_revision().await?;
        let state = Arc::new(ConsoleState::new(records, revision));

        let mut sync = SyncController::new();
        sync.start(
            store.clone(),
            Arc::clone(&settings),
            Arc::clone(&state),
            config.poll_interval,
        )?;

        info!(
            "Admin console {} opened with {} applications",
            store.context_id(),
            state.len()
        );
        Ok(Self {
            store,
            settings,
            state,
            sync: Mutex::new(sync),
            config,
        })
    }

    /// Stop reconciling. The console keeps answering reads from its last
    /// snapshot.
    pub async fn close(&self) -> StoreResult<()> {
        self.sync.lock().await.stop().await?;
        info!("Admin console {} closed", self.store.context_id());
        Ok(())
    }

    pub async fn is_syncing(&self) -> bool {
        self.sync.lock().await.is_running()
    }

    pub fn store(&self) -> &ApplicationStore {
        &self.store
    }

    async fn refresh_snapshot(&self) {
        match self.store.load_revision().await {
            Ok((records, revision)) => {
                self.state.replace(records, revision);
            }
            Err(err) => error!("Failed to refresh admin snapshot: {err}"),
        }
    }

    /// Refresh the snapshot after a mutation and report the outcome as a
    /// notice.
    async fn finish<T>(
        &self,
        result: StoreResult<T>,
        success: impl FnOnce(&T) -> Notice,
    ) -> StoreResult<T> {
        self.refresh_snapshot().await;
        match &result {
            Ok(value) => self.state.show(success(value)),
            Err(err) => {
                if matches!(err, StoreError::Storage(_)) {
                    error!("Admin action failed: {err}");
                }
                self.state.show(Notice::from_error(err));
            }
        }
        result
    }

    pub async fn approve(&self, id: &str) -> StoreResult<ApplicationRecord> {
        let result = self.store.approve(id).await;
        self.finish(result, |_| {
            Notice::success("Student application approved successfully!")
        })
        .await
    }

    pub async fn decline(
        &self,
        id: &str,
        reason: Option<&str>,
        notes: Option<String>,
    ) -> StoreResult<ApplicationRecord> {
        let result = self.store.decline(id, reason, notes).await;
        self.finish(result, |_| Notice::warning("Student application declined"))
            .await
    }

    pub async fn reconsider(&self, id: &str) -> StoreResult<ApplicationRecord> {
        let result = self.store.reconsider(id).await;
        self.finish(result, |_| {
            Notice::success("Application marked for reconsideration")
        })
        .await
    }

    pub async fn graduate(&self, id: &str, date: Option<&str>) -> StoreResult<ApplicationRecord> {
        let result = self.store.graduate(id, date).await;
        self.finish(result, |record| {
            Notice::success(format!("{} has been graduated!", record.full_name()))
        })
        .await
    }

    pub async fn bulk_graduate<I, S>(&self, ids: I, date: Option<&str>) -> StoreResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let result = self.store.bulk_graduate(ids, date).await;
        self.finish(result, |count| {
            Notice::success(format!("Successfully graduated {count} students!"))
        })
        .await
    }

    pub async fn delete(&self, id: &str) -> StoreResult<ApplicationRecord> {
        let result = self.store.remove_by_id(id).await;
        self.finish(result, |record| {
            Notice::warning(format!(
                "Student {} has been deleted permanently",
                record.full_name()
            ))
        })
        .await
    }

    /// Age-based purge using the configured retention window.
    pub async fn purge(&self) -> StoreResult<usize> {
        let result = self.store.purge(self.config.retention_days).await;
        self.finish(result, |count| {
            Notice::success(format!("Cleared {count} old applications"))
        })
        .await
    }

    pub async fn reset_all(&self) -> StoreResult<usize> {
        let result = self.store.clear().await;
        self.finish(result, |_| Notice::warning("All data has been reset"))
            .await
    }

    /// Reload the snapshot on demand.
    pub async fn refresh(&self) -> Vec<ApplicationRecord> {
        self.refresh_snapshot().await;
        self.state.show(Notice::success("Data refreshed successfully!"));
        self.state.records()
    }

    pub fn export(&self, scope: ExportScope) -> StoreResult<CsvExport> {
        let result = export::export(&self.state.records(), scope);
        match &result {
            Ok(csv) => self.state.show(Notice::success(format!(
                "Exported {} records to {}",
                csv.record_count, csv.file_name
            ))),
            Err(err) => self.state.show(Notice::from_error(err)),
        }
        result
    }

    pub fn records(&self) -> Vec<ApplicationRecord> {
        self.state.records()
    }

    pub fn filtered(&self, query: &ApplicationQuery) -> Vec<ApplicationRecord> {
        query.apply(&self.state.records())
    }

    pub fn with_status(&self, status: ApplicationStatus) -> Vec<ApplicationRecord> {
        query::with_status(&self.state.records(), status)
    }

    pub fn recent(&self) -> Vec<ApplicationRecord> {
        query::recent(&self.state.records(), RECENT_LIMIT)
    }

    pub fn stats(&self) -> ApplicationStats {
        self.state.stats()
    }

    /// Statistics of every snapshot the console takes from now on.
    pub fn subscribe_stats(&self) -> watch::Receiver<ApplicationStats> {
        self.state.subscribe_stats()
    }

    /// Simulated: only reports what would have been sent.
    pub async fn send_welcome_email(&self, id: &str) -> StoreResult<ApplicationRecord> {
        let result = self.store.find_by_id(id).await;
        if let Ok(record) = &result {
            info!("Simulated welcome email to {} for {}", record.email, record.student_id);
        }
        self.finish(result, |record| {
            Notice::success(format!("Welcome email sent to {}", record.full_name()))
        })
        .await
    }

    /// Simulated: only graduated students receive a certificate.
    pub async fn generate_certificate(&self, id: &str) -> StoreResult<ApplicationRecord> {
        let result = self
            .store
            .find_by_id(id)
            .await
            .and_then(|record| match record.status {
                ApplicationStatus::Graduated => Ok(record),
                from => Err(StoreError::InvalidTransition {
                    student_id: record.student_id,
                    from,
                    action: "certify",
                }),
            });
        if let Ok(record) = &result {
            info!("Simulated certificate for {}", record.student_id);
        }
        self.finish(result, |record| {
            Notice::success(format!("Certificate generated for {}", record.full_name()))
        })
        .await
    }

    pub fn settings(&self) -> AdminSettings {
        self.settings.current()
    }

    pub async fn save_settings(&self, settings: AdminSettings) -> StoreResult<()> {
        let result = self.settings.update(settings).await;
        match &result {
            Ok(()) => self.state.show(Notice::success("Settings saved successfully!")),
            Err(err) => self.state.show(Notice::from_error(err)),
        }
        result
    }

    /// The notice on display, if it has not expired yet.
    pub fn current_notice(&self) -> Option<Notice> {
        let notice = self.state.notice()?;
        if notice.is_expired(Utc::now(), self.config.notice_ttl) {
            self.state.clear_notice();
            return None;
        }
        Some(notice)
    }
}
