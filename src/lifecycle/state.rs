use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    error::StoreError,
    models::{ApplicationRecord, ApplicationStatus, DeclineReason},
};

pub const GRADUATION_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a caller-supplied graduation date, defaulting to `today` when none
/// was given.
pub fn parse_graduation_date(value: Option<&str>, today: NaiveDate) -> Result<NaiveDate, StoreError> {
    match value.map(str::trim) {
        None | Some("") => Ok(today),
        Some(raw) => NaiveDate::parse_from_str(raw, GRADUATION_DATE_FORMAT).map_err(|_| {
            StoreError::validation(format!(
                "graduation date '{raw}' is not a valid YYYY-MM-DD date"
            ))
        }),
    }
}

impl ApplicationRecord {
    fn require_status(
        &self,
        expected: ApplicationStatus,
        action: &'static str,
    ) -> Result<(), StoreError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(StoreError::InvalidTransition {
                student_id: self.student_id.clone(),
                from: self.status,
                action,
            })
        }
    }

    fn clear_decline(&mut self) {
        self.decline_reason = None;
        self.decline_notes = None;
        self.declined_date = None;
    }

    /// pending -> approved.
    pub fn approve(&mut self, now: DateTime<Utc>) -> Result<(), StoreError> {
        self.require_status(ApplicationStatus::Pending, "approve")?;
        self.status = ApplicationStatus::Approved;
        self.approved_date = Some(now);
        self.clear_decline();
        Ok(())
    }

    /// pending -> declined. Blank notes are stored as absent.
    pub fn decline(
        &mut self,
        reason: DeclineReason,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.require_status(ApplicationStatus::Pending, "decline")?;
        self.status = ApplicationStatus::Declined;
        self.decline_reason = Some(reason);
        self.decline_notes = notes.filter(|n| !n.trim().is_empty());
        self.declined_date = Some(now);
        Ok(())
    }

    /// declined -> pending.
    pub fn reconsider(&mut self) -> Result<(), StoreError> {
        self.require_status(ApplicationStatus::Declined, "reconsider")?;
        self.status = ApplicationStatus::Pending;
        self.clear_decline();
        Ok(())
    }

    /// approved -> graduated.
    pub fn graduate(&mut self, date: NaiveDate) -> Result<(), StoreError> {
        self.require_status(ApplicationStatus::Approved, "graduate")?;
        self.status = ApplicationStatus::Graduated;
        self.graduation_date = Some(date);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::application::fixtures::{record, with_status};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn approve_sets_date_and_keeps_application_date() {
        let applied = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let mut rec = record("NS1", applied);

        rec.approve(now()).unwrap();

        assert_eq!(rec.status, ApplicationStatus::Approved);
        assert_eq!(rec.approved_date, Some(now()));
        assert_eq!(rec.application_date, applied);
        assert!(rec.status_fields_consistent());
    }

    #[test]
    fn approve_rejects_non_pending_without_change() {
        for status in [
            ApplicationStatus::Approved,
            ApplicationStatus::Declined,
            ApplicationStatus::Graduated,
        ] {
            let mut rec = with_status("NS1", status, now());
            let before = rec.clone();
            let err = rec.approve(now()).unwrap_err();
            assert!(matches!(err, StoreError::InvalidTransition { action: "approve", .. }));
            assert_eq!(rec, before);
        }
    }

    #[test]
    fn decline_records_reason_and_drops_blank_notes() {
        let mut rec = record("NS1", now());
        rec.decline(DeclineReason::ProgramFull, Some("   ".into()), now())
            .unwrap();

        assert_eq!(rec.status, ApplicationStatus::Declined);
        assert_eq!(rec.decline_reason, Some(DeclineReason::ProgramFull));
        assert_eq!(rec.decline_notes, None);
        assert_eq!(rec.declined_date, Some(now()));
    }

    #[test]
    fn reconsider_clears_decline_fields() {
        let mut rec = record("NS1", now());
        rec.decline(DeclineReason::Other, Some("missing transcript".into()), now())
            .unwrap();

        rec.reconsider().unwrap();

        assert_eq!(rec.status, ApplicationStatus::Pending);
        assert!(rec.decline_reason.is_none());
        assert!(rec.decline_notes.is_none());
        assert!(rec.declined_date.is_none());
        assert!(rec.status_fields_consistent());
    }

    #[test]
    fn reconsider_refuses_non_declined() {
        let mut rec = with_status("NS1", ApplicationStatus::Approved, now());
        assert!(rec.reconsider().is_err());
        assert_eq!(rec.status, ApplicationStatus::Approved);
    }

    #[test]
    fn graduate_requires_approved() {
        let mut pending = record("NS1", now());
        assert!(pending.graduate(date(2025, 6, 1)).is_err());

        let mut declined = with_status("NS2", ApplicationStatus::Declined, now());
        assert!(declined.graduate(date(2025, 6, 1)).is_err());

        let mut approved = with_status("NS3", ApplicationStatus::Approved, now());
        approved.graduate(date(2025, 6, 1)).unwrap();
        assert_eq!(approved.status, ApplicationStatus::Graduated);
        assert_eq!(approved.graduation_date, Some(date(2025, 6, 1)));
    }

    #[test]
    fn graduated_is_terminal() {
        let mut rec = with_status("NS1", ApplicationStatus::Graduated, now());
        assert!(rec.approve(now()).is_err());
        assert!(rec.decline(DeclineReason::Other, None, now()).is_err());
        assert!(rec.reconsider().is_err());
        assert!(rec.graduate(date(2030, 1, 1)).is_err());
    }

    #[test]
    fn graduation_date_defaults_to_today() {
        let today = date(2024, 6, 15);
        assert_eq!(parse_graduation_date(None, today).unwrap(), today);
        assert_eq!(parse_graduation_date(Some(""), today).unwrap(), today);
        assert_eq!(
            parse_graduation_date(Some("2025-01-31"), today).unwrap(),
            date(2025, 1, 31)
        );
    }

    #[test]
    fn graduation_date_must_be_a_calendar_date() {
        let today = date(2024, 6, 15);
        for raw in ["2025-02-30", "31/01/2025", "soon"] {
            assert!(matches!(
                parse_graduation_date(Some(raw), today),
                Err(StoreError::Validation(_))
            ));
        }
    }
}
