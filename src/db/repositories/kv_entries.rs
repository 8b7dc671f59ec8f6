use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{helpers::parse_datetime, models::KvEntry, Database};

fn row_to_entry(row: &Row) -> Result<KvEntry> {
    let updated_at: String = row.get("updated_at")?;

    Ok(KvEntry {
        key: row.get("key")?,
        value: row.get("value")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
        revision: row.get("revision")?,
    })
}

impl Database {
    /// Fetch a named blob with its metadata.
    pub async fn get_entry(&self, key: &str) -> Result<Option<KvEntry>> {
        let key = key.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT key, value, updated_at, revision
                 FROM kv_entries
                 WHERE key = ?1",
            )?;

            let mut rows = stmt.query(params![key])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_entry(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    /// Fetch only the raw serialized value of a named blob.
    pub async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.execute(move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM kv_entries WHERE key = ?1",
                    params![key],
                    |row| row.get::<_, String>(0),
                )
                .optional()
                .with_context(|| format!("failed to read '{key}'"))?;
            Ok(value)
        })
        .await
    }

    /// Replace a named blob wholesale.
    pub async fn put_value(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.execute(move |conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO kv_entries (key, value, updated_at, revision)
                 VALUES (?1, ?2, ?3, 1)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at,
                     revision = kv_entries.revision + 1",
                params![key, value, now.to_rfc3339()],
            )
            .with_context(|| format!("failed to write '{key}'"))?;
            Ok(())
        })
        .await
    }
}
