pub mod application;
pub mod catalog;

pub use application::{ApplicationRecord, ApplicationStatus};
pub use catalog::{DeclineReason, Program};
