//! Applicant-facing intake: form validation, id allocation and submission.

pub mod form;
pub mod service;
pub mod student_id;
pub mod validation;

pub use form::{IntakeForm, ValidIntake};
pub use service::IntakeService;
pub use student_id::{format_student_id, StudentIdGenerator};
pub use validation::{format_phone_number, FieldError, PhotoUpload};
