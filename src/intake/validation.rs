//! Field-level validation for the intake form.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_PATTERN: &str = r"^[\d\s\-\+\(\)]{10,}$";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("valid regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("valid regex"));

/// Minimum number of digits a phone number must carry.
pub const MIN_PHONE_DIGITS: usize = 10;

/// Largest accepted photo upload (5 MiB).
pub const MAX_PHOTO_BYTES: u64 = 5 * 1024 * 1024;

pub const ACCEPTED_PHOTO_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// A single invalid form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    pub fn required(field: &'static str) -> Self {
        Self::new(field, "This field is required")
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Digits, spaces and `-+()` only, with at least [`MIN_PHONE_DIGITS`] digits.
pub fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.is_match(value)
        && value.chars().filter(char::is_ascii_digit).count() >= MIN_PHONE_DIGITS
}

/// Metadata of an uploaded photo. The image bytes never reach the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUpload {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

pub fn validate_photo(photo: &PhotoUpload) -> Result<(), StoreError> {
    let mime = photo.mime_type.to_lowercase();
    if !ACCEPTED_PHOTO_TYPES.contains(&mime.as_str()) {
        return Err(StoreError::validation(
            "Please upload a valid image file (JPG, PNG, or WEBP)",
        ));
    }
    if photo.size > MAX_PHOTO_BYTES {
        return Err(StoreError::validation("File size must be less than 5MB"));
    }
    Ok(())
}

/// Progressive `(XXX) XXX-XXXX` formatting of whatever digits `value` holds.
pub fn format_phone_number(value: &str) -> String {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        0..=3 => digits,
        4..=6 => format!("({}) {}", &digits[..3], &digits[3..]),
        len => format!(
            "({}) {}-{}",
            &digits[..3],
            &digits[3..6],
            &digits[6..len.min(10)]
        ),
    }
}
