pub mod duration;
pub mod state;

pub use duration::{days_between, format_study_duration, study_duration};
pub use state::{parse_graduation_date, GRADUATION_DATE_FORMAT};
