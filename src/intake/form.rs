use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{StoreError, StoreResult},
    models::{ApplicationRecord, ApplicationStatus, Program},
};

use super::validation::{is_valid_email, is_valid_phone, validate_photo, FieldError, PhotoUpload};

/// Raw values as entered on the intake form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntakeForm {
    pub student_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub gender: String,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub guardian_name: Option<String>,
    pub parents_contact: Option<String>,
    pub program: String,
    pub level: String,
    pub start_date: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub emergency_contact: String,
    pub education: Option<String>,
    pub accommodations: Option<String>,
    pub terms: bool,
    pub communications: bool,
    pub photo: Option<PhotoUpload>,
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl IntakeForm {
    fn required_fields(&self) -> [(&'static str, &str); 15] {
        [
            ("firstName", self.first_name.as_str()),
            ("lastName", self.last_name.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
            ("dateOfBirth", self.date_of_birth.as_str()),
            ("gender", self.gender.as_str()),
            ("program", self.program.as_str()),
            ("level", self.level.as_str()),
            ("startDate", self.start_date.as_str()),
            ("address", self.address.as_str()),
            ("city", self.city.as_str()),
            ("state", self.state.as_str()),
            ("zipCode", self.zip_code.as_str()),
            ("country", self.country.as_str()),
            ("emergencyContact", self.emergency_contact.as_str()),
        ]
    }

    /// Every invalid field, in form order. Empty when the form is valid.
    pub fn field_errors(&self) -> Vec<FieldError> {
        let mut errors: Vec<FieldError> = self
            .required_fields()
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| FieldError::required(field))
            .collect();

        let email = self.email.trim();
        if !email.is_empty() && !is_valid_email(email) {
            errors.push(FieldError::new("email", "Please enter a valid email address"));
        }

        let phone = self.phone.trim();
        if !phone.is_empty() && !is_valid_phone(phone) {
            errors.push(FieldError::new("phone", "Please enter a valid phone number"));
        }

        let program = self.program.trim();
        if !program.is_empty() && program.parse::<Program>().is_err() {
            errors.push(FieldError::new("program", format!("Unknown program '{program}'")));
        }

        if !self.terms {
            errors.push(FieldError::new(
                "terms",
                "Please accept the terms and conditions",
            ));
        }

        errors
    }

    /// Check the whole form and normalise it for storage.
    pub fn validate(self) -> StoreResult<ValidIntake> {
        let errors = self.field_errors();
        if !errors.is_empty() {
            let summary = errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(StoreError::validation(summary));
        }

        if let Some(photo) = &self.photo {
            validate_photo(photo)?;
        }

        let program = self.program.trim().parse::<Program>()?;
        Ok(ValidIntake {
            form: self,
            program,
        })
    }
}

/// A form that passed validation.
#[derive(Debug, Clone)]
pub struct ValidIntake {
    form: IntakeForm,
    program: Program,
}

impl ValidIntake {
    /// Id the applicant typed in, if any.
    pub fn requested_id(&self) -> Option<&str> {
        self.form
            .student_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn into_record(self, student_id: String, application_date: DateTime<Utc>) -> ApplicationRecord {
        let form = self.form;
        let (photo_name, photo_size) = match form.photo {
            Some(photo) => (Some(photo.name), Some(photo.size)),
            None => (None, None),
        };

        ApplicationRecord {
            student_id,
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            date_of_birth: form.date_of_birth.trim().to_string(),
            gender: form.gender.trim().to_string(),
            father_name: optional(form.father_name),
            mother_name: optional(form.mother_name),
            guardian_name: optional(form.guardian_name),
            parents_contact: optional(form.parents_contact),
            program: self.program,
            level: form.level.trim().to_string(),
            start_date: form.start_date.trim().to_string(),
            address: form.address.trim().to_string(),
            city: form.city.trim().to_string(),
            state: form.state.trim().to_string(),
            zip_code: form.zip_code.trim().to_string(),
            country: form.country.trim().to_string(),
            emergency_contact: form.emergency_contact.trim().to_string(),
            education: optional(form.education),
            accommodations: optional(form.accommodations),
            terms: form.terms,
            communications: form.communications,
            photo_name,
            photo_size,
            status: ApplicationStatus::Pending,
            application_date,
            approved_date: None,
            declined_date: None,
            decline_reason: None,
            decline_notes: None,
            graduation_date: None,
        }
    }
}
