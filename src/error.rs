//! Error taxonomy shared by the record store, intake and admin console.

use crate::models::ApplicationStatus;

/// Failure of a store-mutating operation. None of these leave a partial
/// effect behind: the persisted collection is unchanged when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),

    #[error("application {0} not found")]
    NotFound(String),

    #[error("cannot {action} application {student_id} while it is {from}")]
    InvalidTransition {
        student_id: String,
        from: ApplicationStatus,
        action: &'static str,
    },

    #[error("student id {0} is already in use")]
    DuplicateId(String),

    #[error("a submission is already in progress")]
    SubmissionInProgress,

    #[error("no data to export")]
    NothingToExport,

    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Stable machine-readable code for the failure.
    pub fn reason_code(&self) -> &'static str {
        match self {
            StoreError::Validation(_) => "validation",
            StoreError::NotFound(_) => "not_found",
            StoreError::InvalidTransition { .. } => "invalid_transition",
            StoreError::DuplicateId(_) => "duplicate_id",
            StoreError::SubmissionInProgress => "submission_in_progress",
            StoreError::NothingToExport => "nothing_to_export",
            StoreError::Storage(_) => "storage",
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_codes_are_distinct() {
        let errors = [
            StoreError::validation("x"),
            StoreError::NotFound("NS1".into()),
            StoreError::InvalidTransition {
                student_id: "NS1".into(),
                from: ApplicationStatus::Pending,
                action: "graduate",
            },
            StoreError::DuplicateId("NS1".into()),
            StoreError::SubmissionInProgress,
            StoreError::NothingToExport,
            StoreError::Storage(anyhow::anyhow!("disk")),
        ];

        let mut codes: Vec<_> = errors.iter().map(StoreError::reason_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn invalid_transition_message_names_status() {
        let err = StoreError::InvalidTransition {
            student_id: "NS123456".into(),
            from: ApplicationStatus::Declined,
            action: "approve",
        };
        assert_eq!(
            err.to_string(),
            "cannot approve application NS123456 while it is declined"
        );
    }
}
