use chrono::{DateTime, Duration, Utc};
use log::info;

use crate::{
    error::{StoreError, StoreResult},
    lifecycle::parse_graduation_date,
    models::{ApplicationRecord, ApplicationStatus, DeclineReason},
};

use super::ApplicationStore;

pub const DEFAULT_RETENTION_DAYS: u32 = 30;

fn find_mut<'a>(
    records: &'a mut [ApplicationRecord],
    id: &str,
) -> StoreResult<&'a mut ApplicationRecord> {
    records
        .iter_mut()
        .find(|record| record.student_id == id)
        .ok_or_else(|| StoreError::NotFound(id.to_string()))
}

impl ApplicationStore {
    pub async fn approve(&self, id: &str) -> StoreResult<ApplicationRecord> {
        let now = Utc::now();
        let updated = self
            .mutate(|records| {
                let record = find_mut(records, id)?;
                record.approve(now)?;
                Ok(record.clone())
            })
            .await?;
        info!("Approved application {id}");
        Ok(updated)
    }

    /// `reason` is the decline reason code; a missing or unknown code is a
    /// validation failure and nothing is written.
    pub async fn decline(
        &self,
        id: &str,
        reason: Option<&str>,
        notes: Option<String>,
    ) -> StoreResult<ApplicationRecord> {
        let reason = DeclineReason::parse_required(reason)?;
        let now = Utc::now();
        let updated = self
            .mutate(|records| {
                let record = find_mut(records, id)?;
                record.decline(reason, notes, now)?;
                Ok(record.clone())
            })
            .await?;
        info!("Declined application {id} ({reason})");
        Ok(updated)
    }

    pub async fn reconsider(&self, id: &str) -> StoreResult<ApplicationRecord> {
        let updated = self
            .mutate(|records| {
                let record = find_mut(records, id)?;
                record.reconsider()?;
                Ok(record.clone())
            })
            .await?;
        info!("Application {id} returned to pending");
        Ok(updated)
    }

    /// `date` is `YYYY-MM-DD`; `None` means today.
    pub async fn graduate(&self, id: &str, date: Option<&str>) -> StoreResult<ApplicationRecord> {
        let date = parse_graduation_date(date, Utc::now().date_naive())?;
        let updated = self
            .mutate(|records| {
                let record = find_mut(records, id)?;
                record.graduate(date)?;
                Ok(record.clone())
            })
            .await?;
        info!("Graduated application {id} on {date}");
        Ok(updated)
    }

    /// Graduate every listed record that is currently approved. Unknown ids
    /// and records in any other status are skipped. Returns how many
    /// graduated.
    pub async fn bulk_graduate<I, S>(&self, ids: I, date: Option<&str>) -> StoreResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let date = parse_graduation_date(date, Utc::now().date_naive())?;
        let ids: Vec<String> = ids.into_iter().map(|id| id.as_ref().to_string()).collect();
        if ids.is_empty() {
            return Err(StoreError::validation(
                "select at least one student to graduate",
            ));
        }

        let graduated = self
            .mutate(|records| {
                let mut count = 0;
                for record in records.iter_mut() {
                    if record.status == ApplicationStatus::Approved
                        && ids.contains(&record.student_id)
                        && record.graduate(date).is_ok()
                    {
                        count += 1;
                    }
                }
                Ok(count)
            })
            .await?;
        info!("Bulk graduation on {date}: {graduated} of {} selected", ids.len());
        Ok(graduated)
    }

    /// Remove every record whose application date is strictly before
    /// `cutoff`, whatever its status.
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> StoreResult<usize> {
        let removed = self
            .mutate(|records| {
                let before = records.len();
                records.retain(|record| record.application_date >= cutoff);
                Ok(before - records.len())
            })
            .await?;
        info!("Purged {removed} applications submitted before {cutoff}");
        Ok(removed)
    }

    /// Age-based purge with a retention window of `retention_days`. A window
    /// reaching past the earliest representable date removes nothing.
    pub async fn purge(&self, retention_days: u32) -> StoreResult<usize> {
        let cutoff = Duration::try_days(i64::from(retention_days))
            .and_then(|window| Utc::now().checked_sub_signed(window));
        match cutoff {
            Some(cutoff) => self.purge_older_than(cutoff).await,
            None => {
                info!("Retention window of {retention_days} days predates every record, nothing purged");
                Ok(0)
            }
        }
    }
}
