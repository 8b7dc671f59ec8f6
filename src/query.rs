//! Read-only views over a collection. Nothing here touches the store.

use serde::{Deserialize, Serialize};

use crate::models::{ApplicationRecord, ApplicationStatus, Program};

/// Number of rows in the dashboard's recent-applications table.
pub const RECENT_LIMIT: usize = 5;

/// Admin table filter. Absent criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationQuery {
    pub status: Option<ApplicationStatus>,
    pub program: Option<Program>,
    pub text: Option<String>,
}

impl ApplicationQuery {
    pub fn with_status(mut self, status: ApplicationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_program(mut self, program: Program) -> Self {
        self.program = Some(program);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn matches(&self, record: &ApplicationRecord) -> bool {
        let status_ok = self.status.map_or(true, |status| record.status == status);
        let program_ok = self.program.map_or(true, |program| record.program == program);
        let text_ok = match self.text.as_deref().map(str::to_lowercase) {
            None => true,
            Some(needle) if needle.is_empty() => true,
            Some(needle) => [
                &record.first_name,
                &record.last_name,
                &record.email,
                &record.student_id,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle)),
        };

        status_ok && program_ok && text_ok
    }

    /// Matching records, in collection order.
    pub fn apply(&self, records: &[ApplicationRecord]) -> Vec<ApplicationRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

/// Records with the given status, in collection order.
pub fn with_status(records: &[ApplicationRecord], status: ApplicationStatus) -> Vec<ApplicationRecord> {
    ApplicationQuery::default().with_status(status).apply(records)
}

/// The `limit` most recently submitted records, newest first.
pub fn recent(records: &[ApplicationRecord], limit: usize) -> Vec<ApplicationRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.application_date.cmp(&a.application_date));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::models::application::fixtures::{record, with_status as fixture};

    fn sample() -> Vec<ApplicationRecord> {
        let now = Utc::now();
        let mut grace = fixture("NS100001", ApplicationStatus::Approved, now);
        grace.first_name = "Grace".into();
        grace.last_name = "Hopper".into();
        grace.email = "grace@navy.mil".into();
        grace.program = Program::Robotics;

        let mut alan = record("NS100002", now);
        alan.first_name = "Alan".into();
        alan.last_name = "Turing".into();
        alan.email = "alan@bletchley.uk".into();

        vec![grace, alan]
    }

    #[test]
    fn empty_query_matches_everything() {
        assert_eq!(ApplicationQuery::default().apply(&sample()).len(), 2);
    }

    #[test]
    fn text_is_case_insensitive_across_fields() {
        let records = sample();
        for needle in ["GRACE", "hopper", "NAVY.MIL", "ns100001"] {
            let found = ApplicationQuery::default().with_text(needle).apply(&records);
            assert_eq!(found.len(), 1, "{needle}");
            assert_eq!(found[0].first_name, "Grace");
        }
        assert!(ApplicationQuery::default()
            .with_text("nobody")
            .apply(&records)
            .is_empty());
    }

    #[test]
    fn criteria_combine_with_and() {
        let records = sample();
        let query = ApplicationQuery::default()
            .with_status(ApplicationStatus::Approved)
            .with_program(Program::ComputerScience);
        assert!(query.apply(&records).is_empty());

        let query = ApplicationQuery::default()
            .with_status(ApplicationStatus::Pending)
            .with_text("ns1000");
        assert_eq!(query.apply(&records)[0].first_name, "Alan");
    }

    #[test]
    fn filtering_does_not_mutate_input() {
        let records = sample();
        let before = records.clone();
        let _ = ApplicationQuery::default().with_text("x").apply(&records);
        assert_eq!(records, before);
    }

    #[test]
    fn recent_orders_newest_first_and_limits() {
        let now = Utc::now();
        let records: Vec<_> = (0..7)
            .map(|i| record(&format!("NS{i}"), now - Duration::days(i)))
            .collect();

        let ids: Vec<_> = recent(&records, RECENT_LIMIT)
            .into_iter()
            .map(|r| r.student_id)
            .collect();
        assert_eq!(ids, vec!["NS0", "NS1", "NS2", "NS3", "NS4"]);
    }

    #[test]
    fn status_view() {
        let approved = with_status(&sample(), ApplicationStatus::Approved);
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].last_name, "Hopper");
    }
}
