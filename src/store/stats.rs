use serde::{Deserialize, Serialize};

use crate::models::{ApplicationRecord, ApplicationStatus};

/// Dashboard counters. `total` is always the sum of the four partitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub declined: usize,
    pub graduated: usize,
}

impl ApplicationStats {
    pub fn count(&self, status: ApplicationStatus) -> usize {
        match status {
            ApplicationStatus::Pending => self.pending,
            ApplicationStatus::Approved => self.approved,
            ApplicationStatus::Declined => self.declined,
            ApplicationStatus::Graduated => self.graduated,
        }
    }
}

pub fn derive_stats(records: &[ApplicationRecord]) -> ApplicationStats {
    let mut stats = ApplicationStats::default();
    for record in records {
        match record.status {
            ApplicationStatus::Pending => stats.pending += 1,
            ApplicationStatus::Approved => stats.approved += 1,
            ApplicationStatus::Declined => stats.declined += 1,
            ApplicationStatus::Graduated => stats.graduated += 1,
        }
    }
    stats.total = stats.pending + stats.approved + stats.declined + stats.graduated;
    stats
}
