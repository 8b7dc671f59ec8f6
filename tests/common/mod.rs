#![allow(dead_code)]

use std::time::Duration;

use neostudent::{AppConfig, IntakeForm, Portal};

pub fn config(poll_interval: Duration) -> AppConfig {
    AppConfig {
        poll_interval,
        submit_delay: Duration::ZERO,
        ..AppConfig::default()
    }
}

pub fn portal(poll_interval: Duration) -> Portal {
    Portal::open(config(poll_interval)).expect("in-memory portal")
}

pub fn sample_form(first_name: &str, email: &str) -> IntakeForm {
    IntakeForm {
        first_name: first_name.into(),
        last_name: "Hopper".into(),
        email: email.into(),
        phone: "+1 (212) 555-0147".into(),
        date_of_birth: "2001-12-09".into(),
        gender: "female".into(),
        guardian_name: Some("Walter Murray".into()),
        program: "computer-science".into(),
        level: "undergraduate".into(),
        start_date: "2024-01-15".into(),
        address: "5 Navy Yard".into(),
        city: "New York".into(),
        state: "NY".into(),
        zip_code: "10001".into(),
        country: "USA".into(),
        emergency_contact: "212-555-0199".into(),
        education: Some("High school diploma".into()),
        terms: true,
        communications: true,
        ..IntakeForm::default()
    }
}

/// Poll `check` until it holds or two seconds pass.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
