pub mod admin;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod intake;
pub mod lifecycle;
pub mod models;
pub mod notice;
pub mod query;
pub mod settings;
pub mod store;
mod utils;

use log::info;

pub use admin::AdminConsole;
pub use config::AppConfig;
pub use db::Database;
pub use error::{StoreError, StoreResult};
pub use export::{CsvExport, ExportScope};
pub use intake::{IntakeForm, IntakeService, PhotoUpload};
pub use models::{ApplicationRecord, ApplicationStatus, DeclineReason, Program};
pub use notice::{Notice, NoticeKind};
pub use query::ApplicationQuery;
pub use settings::AdminSettings;
pub use store::{ApplicationStats, ApplicationStore, SharedStorage};

/// Install the `env_logger` backend. `RUST_LOG` overrides the default
/// `info` filter. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}

/// One origin's worth of storage from which any number of intake and admin
/// pages can be opened. Each page gets its own context.
#[derive(Clone)]
pub struct Portal {
    storage: SharedStorage,
    config: AppConfig,
}

impl Portal {
    pub fn open(config: AppConfig) -> StoreResult<Self> {
        let db = match &config.db_path {
            Some(path) => Database::new(path.clone())?,
            None => Database::open_in_memory()?,
        };
        info!(
            "NeoStudent portal opened ({})",
            db.path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "in-memory".to_string())
        );
        Ok(Self {
            storage: SharedStorage::new(db),
            config,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    pub fn intake_page(&self) -> IntakeService {
        IntakeService::new(
            ApplicationStore::new(self.storage.clone()),
            self.config.submit_delay,
        )
    }

    pub async fn admin_page(&self) -> StoreResult<AdminConsole> {
        AdminConsole::open(
            ApplicationStore::new(self.storage.clone()),
            self.config.clone(),
        )
        .await
    }
}
