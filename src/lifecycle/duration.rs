use chrono::NaiveDate;

const DAYS_PER_YEAR: i64 = 365;
const DAYS_PER_MONTH: i64 = 30;

/// Whole days between two dates regardless of order.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days().abs()
}

/// Render a day count as `"{y}y {m}m"`, `"{m} months"` or `"{d} days"`.
pub fn format_study_duration(days: i64) -> String {
    let days = days.abs();
    let years = days / DAYS_PER_YEAR;
    let months = (days % DAYS_PER_YEAR) / DAYS_PER_MONTH;

    if years > 0 {
        format!("{years}y {months}m")
    } else if months > 0 {
        format!("{months} months")
    } else {
        format!("{days} days")
    }
}

/// Study duration of a graduated record. `None` when the start date is not a
/// `YYYY-MM-DD` date.
pub fn study_duration(start_date: &str, graduation_date: NaiveDate) -> Option<String> {
    let start = NaiveDate::parse_from_str(start_date.trim(), "%Y-%m-%d").ok()?;
    Some(format_study_duration(days_between(start, graduation_date)))
}
