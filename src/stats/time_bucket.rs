//! Day bucketing for usage aggregation
//!
//! Buckets are "YYYY-MM-DD" strings in UTC so they sort lexically.

use chrono::{DateTime, Datelike, Duration, Utc};

/// Day bucket for a timestamp
pub fn day_bucket(at: DateTime<Utc>) -> String {
    format!("{:04}-{:02}-{:02}", at.year(), at.month(), at.day())
}

/// The `days` buckets ending at `now`, oldest first
pub fn trailing_day_buckets(now: DateTime<Utc>, days: u32) -> Vec<String> {
    (0..days as i64)
        .rev()
        .map(|offset| day_bucket(now - Duration::days(offset)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_day_bucket() {
        let at = Utc.with_ymd_and_hms(2023, 12, 28, 23, 59, 59).unwrap();
        assert_eq!(day_bucket(at), "2023-12-28");
    }

    #[test]
    fn test_trailing_day_buckets_cross_month() {
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap();
        assert_eq!(
            trailing_day_buckets(now, 3),
            vec!["2024-02-29", "2024-03-01", "2024-03-02"]
        );
    }
}
