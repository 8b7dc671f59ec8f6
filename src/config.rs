use std::{path::PathBuf, time::Duration};

use log::warn;

use crate::{notice::NOTICE_TTL, store::DEFAULT_RETENTION_DAYS};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const DEBUG_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_SUBMIT_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// `None` keeps the database in memory.
    pub db_path: Option<PathBuf>,
    pub poll_interval: Duration,
    pub submit_delay: Duration,
    pub retention_days: u32,
    pub notice_ttl: Duration,
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            submit_delay: DEFAULT_SUBMIT_DELAY,
            retention_days: DEFAULT_RETENTION_DAYS,
            notice_ttl: NOTICE_TTL,
            debug: false,
        }
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {name}={raw:?}: not a number");
            None
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Unset or unparsable values
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("NEOSTUDENT_DB_PATH").filter(|p| !p.trim().is_empty()) {
            config.db_path = Some(PathBuf::from(path));
        }
        if let Some(secs) = parse_number::<u64>(
            "NEOSTUDENT_POLL_INTERVAL_SECS",
            lookup("NEOSTUDENT_POLL_INTERVAL_SECS"),
        )
        .filter(|secs| *secs > 0)
        {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_number::<u64>(
            "NEOSTUDENT_SUBMIT_DELAY_MS",
            lookup("NEOSTUDENT_SUBMIT_DELAY_MS"),
        ) {
            config.submit_delay = Duration::from_millis(ms);
        }
        if let Some(days) = parse_number::<u32>(
            "NEOSTUDENT_RETENTION_DAYS",
            lookup("NEOSTUDENT_RETENTION_DAYS"),
        ) {
            config.retention_days = days;
        }

        config.debug = lookup("NEOSTUDENT_DEBUG")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true"))
            .unwrap_or(false);
        if config.debug {
            config.poll_interval = DEBUG_POLL_INTERVAL;
        }

        config
    }
}
