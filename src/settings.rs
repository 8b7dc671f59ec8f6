use std::sync::{PoisonError, RwLock};

use anyhow::Context;
use log::warn;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{StoreError, StoreResult},
    intake::validation::is_valid_email,
    store::{SharedStorage, SETTINGS_KEY},
};

const DEFAULT_MAX_APPLICATIONS: u32 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminSettings {
    pub auto_approval: bool,
    pub notification_email: String,
    pub max_applications: u32,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            auto_approval: false,
            notification_email: String::new(),
            max_applications: DEFAULT_MAX_APPLICATIONS,
        }
    }
}

impl AdminSettings {
    pub fn validate(&self) -> StoreResult<()> {
        let email = self.notification_email.trim();
        if !email.is_empty() && !is_valid_email(email) {
            return Err(StoreError::validation(format!(
                "'{email}' is not a valid notification email"
            )));
        }
        if self.max_applications == 0 {
            return Err(StoreError::validation(
                "maximum applications must be at least 1",
            ));
        }
        Ok(())
    }
}

fn decode(raw: Option<String>) -> AdminSettings {
    match raw {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!("Persisted settings are unreadable, using defaults: {err}");
            AdminSettings::default()
        }),
        None => AdminSettings::default(),
    }
}

/// Cached view of the persisted admin settings.
pub struct SettingsStore {
    storage: SharedStorage,
    context_id: Uuid,
    data: RwLock<AdminSettings>,
}

impl SettingsStore {
    pub async fn load(storage: SharedStorage, context_id: Uuid) -> StoreResult<Self> {
        let raw = storage.database().get_value(SETTINGS_KEY).await?;
        Ok(Self {
            storage,
            context_id,
            data: RwLock::new(decode(raw)),
        })
    }

    pub fn current(&self) -> AdminSettings {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn update(&self, settings: AdminSettings) -> StoreResult<()> {
        settings.validate()?;
        let serialized =
            serde_json::to_string_pretty(&settings).context("failed to serialize settings")?;
        self.storage
            .write(self.context_id, SETTINGS_KEY, serialized)
            .await?;
        *self.data.write().unwrap_or_else(PoisonError::into_inner) = settings;
        Ok(())
    }

    /// Re-read the persisted settings, picking up writes from other contexts.
    pub async fn reload(&self) -> StoreResult<AdminSettings> {
        let raw = self.storage.database().get_value(SETTINGS_KEY).await?;
        let settings = decode(raw);
        *self.data.write().unwrap_or_else(PoisonError::into_inner) = settings.clone();
        Ok(settings)
    }
}
