use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

pub const STUDENT_ID_PREFIX: &str = "NS";

const ID_MODULUS: i64 = 1_000_000;

/// `"NS"` followed by the last six digits of `timestamp_ms`.
pub fn format_student_id(timestamp_ms: i64) -> String {
    format!("{STUDENT_ID_PREFIX}{:06}", timestamp_ms.rem_euclid(ID_MODULUS))
}

/// Issues ids from a strictly increasing millisecond clock, so two ids
/// generated in the same millisecond still differ.
#[derive(Debug, Default)]
pub struct StudentIdGenerator {
    last_ms: AtomicI64,
}

impl StudentIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_timestamp(&self, now_ms: i64) -> i64 {
        let previous = self
            .last_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now_ms.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now_ms.max(previous + 1)
    }

    pub fn next_id(&self) -> String {
        format_student_id(self.next_timestamp(Utc::now().timestamp_millis()))
    }

    /// Next id for which `taken` is false.
    pub fn next_unique(&self, mut taken: impl FnMut(&str) -> bool) -> String {
        loop {
            let candidate = self.next_id();
            if !taken(&candidate) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_last_six_digits() {
        assert_eq!(format_student_id(1_717_171_234_567), "NS234567");
        assert_eq!(format_student_id(1_700_000_000_042), "NS000042");
    }

    #[test]
    fn timestamps_strictly_increase() {
        let generator = StudentIdGenerator::new();
        let a = generator.next_timestamp(1_000);
        let b = generator.next_timestamp(1_000);
        let c = generator.next_timestamp(999);
        let d = generator.next_timestamp(5_000);
        assert_eq!((a, b, c, d), (1_000, 1_001, 1_002, 5_000));
    }

    #[test]
    fn generated_ids_are_distinct() {
        let generator = StudentIdGenerator::new();
        let ids: std::collections::HashSet<_> = (0..100).map(|_| generator.next_id()).collect();
        assert_eq!(ids.len(), 100);
        assert!(ids.iter().all(|id| id.starts_with("NS") && id.len() == 8));
    }

    #[test]
    fn next_unique_skips_taken_ids() {
        let generator = StudentIdGenerator::new();
        let first = generator.next_id();
        let mut seen = vec![first.clone()];
        let next = generator.next_unique(|candidate| {
            let hit = seen.len() < 3;
            seen.push(candidate.to_string());
            hit
        });
        assert_ne!(next, first);
    }
}
