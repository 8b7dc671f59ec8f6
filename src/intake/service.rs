use std::{
    collections::HashSet,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use chrono::Utc;
use log::{info, warn};

use crate::{
    error::{StoreError, StoreResult},
    models::ApplicationRecord,
    store::ApplicationStore,
};

use super::{form::IntakeForm, student_id::StudentIdGenerator};

const MAX_ID_ATTEMPTS: usize = 3;

/// Clears the in-flight flag when the submission finishes, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> StoreResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| StoreError::SubmissionInProgress)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The applicant-facing page: validates a form and appends it as a new
/// pending application.
pub struct IntakeService {
    store: ApplicationStore,
    ids: StudentIdGenerator,
    submit_delay: Duration,
    submitting: AtomicBool,
}

impl IntakeService {
    pub fn new(store: ApplicationStore, submit_delay: Duration) -> Self {
        Self {
            store,
            ids: StudentIdGenerator::new(),
            submit_delay,
            submitting: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &ApplicationStore {
        &self.store
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub async fn submit(&self, form: IntakeForm) -> StoreResult<ApplicationRecord> {
        let intake = form.validate()?;
        let _guard = InFlight::acquire(&self.submitting)?;

        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }

        if let Some(requested) = intake.requested_id() {
            let record = intake.clone().into_record(requested.to_string(), Utc::now());
            self.store.append(record.clone()).await?;
            info!("Received application {} from {}", record.student_id, record.email);
            return Ok(record);
        }

        for _ in 0..MAX_ID_ATTEMPTS {
            let existing: HashSet<String> = self
                .store
                .try_load()
                .await?
                .into_iter()
                .map(|r| r.student_id)
                .collect();
            let student_id = self.ids.next_unique(|candidate| existing.contains(candidate));
            let record = intake.clone().into_record(student_id, Utc::now());

            match self.store.append(record.clone()).await {
                Ok(()) => {
                    info!("Received application {} from {}", record.student_id, record.email);
                    return Ok(record);
                }
                Err(StoreError::DuplicateId(id)) => {
                    warn!("Generated student id {id} was taken concurrently, retrying");
                }
                Err(err) => return Err(err),
            }
        }

        Err(StoreError::validation(
            "could not allocate a unique student id, please retry",
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        db::Database,
        intake::form::fixtures::filled_form,
        models::ApplicationStatus,
        store::SharedStorage,
    };

    fn service(delay: Duration) -> IntakeService {
        let storage = SharedStorage::new(Database::open_in_memory().unwrap());
        IntakeService::new(ApplicationStore::new(storage), delay)
    }

    #[tokio::test]
    async fn submit_appends_pending_record_with_generated_id() {
        let service = service(Duration::ZERO);

        let record = service.submit(filled_form()).await.unwrap();

        assert_eq!(record.status, ApplicationStatus::Pending);
        assert!(record.student_id.starts_with("NS"));
        assert_eq!(service.store().load().await, vec![record]);
        assert!(!service.is_submitting());
    }

    #[tokio::test]
    async fn requested_id_is_used_and_duplicates_rejected() {
        let service = service(Duration::ZERO);
        let form = IntakeForm {
            student_id: Some("NS777777".into()),
            ..filled_form()
        };

        let record = service.submit(form.clone()).await.unwrap();
        assert_eq!(record.student_id, "NS777777");

        let err = service.submit(form).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(id) if id == "NS777777"));
        assert_eq!(service.store().load().await.len(), 1);
    }

    #[tokio::test]
    async fn invalid_form_is_not_stored() {
        let service = service(Duration::ZERO);
        let form = IntakeForm {
            terms: false,
            ..filled_form()
        };

        assert!(matches!(
            service.submit(form).await,
            Err(StoreError::Validation(_))
        ));
        assert!(service.store().load().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn second_submission_while_in_flight_is_rejected() {
        let service = Arc::new(service(Duration::from_secs(2)));

        let first = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.submit(filled_form()).await })
        };
        while !service.is_submitting() {
            tokio::task::yield_now().await;
        }
        tokio::time::advance(Duration::from_millis(500)).await;

        assert!(service.is_submitting());
        assert!(matches!(
            service.submit(filled_form()).await,
            Err(StoreError::SubmissionInProgress)
        ));

        assert!(first.await.unwrap().is_ok());
        assert!(!service.is_submitting());
        assert_eq!(service.store().load().await.len(), 1);
    }
}
