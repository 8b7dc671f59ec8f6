//! Application record data model.
//!
//! Field names serialize in camelCase so the persisted `applications` blob
//! keeps the shape the intake form has always written.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{DeclineReason, Program};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Declined,
    Graduated,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Approved,
        ApplicationStatus::Declined,
        ApplicationStatus::Graduated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Declined => "declined",
            ApplicationStatus::Graduated => "graduated",
        }
    }

    /// Graduated records accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ApplicationStatus::Graduated)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One student application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub gender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents_contact: Option<String>,
    pub program: Program,
    pub level: String,
    pub start_date: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub emergency_contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accommodations: Option<String>,
    #[serde(default)]
    pub terms: bool,
    #[serde(default)]
    pub communications: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_size: Option<u64>,
    pub status: ApplicationStatus,
    pub application_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declined_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline_reason: Option<DeclineReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graduation_date: Option<NaiveDate>,
}

impl ApplicationRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// True when every status-bound field agrees with `status`: decline
    /// fields only while declined, a graduation date only once graduated, an
    /// approval date only on approved or graduated records.
    pub fn status_fields_consistent(&self) -> bool {
        let declined = self.status == ApplicationStatus::Declined;
        let graduated = self.status == ApplicationStatus::Graduated;
        let admitted = matches!(
            self.status,
            ApplicationStatus::Approved | ApplicationStatus::Graduated
        );

        let decline_ok = if declined {
            self.decline_reason.is_some() && self.declined_date.is_some()
        } else {
            self.decline_reason.is_none()
                && self.decline_notes.is_none()
                && self.declined_date.is_none()
        };

        decline_ok
            && self.graduation_date.is_some() == graduated
            && (admitted || self.approved_date.is_none())
            && (self.status != ApplicationStatus::Approved || self.approved_date.is_some())
    }
}
