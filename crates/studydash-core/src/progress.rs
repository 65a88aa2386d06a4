//! Event countdown math.
//!
//! The percentage is the share of time *remaining*, so a bar drawn from it
//! starts full when the event is created and drains to empty on the day.

use chrono::{DateTime, NaiveDate, TimeZone};

/// Events this close (in days) are flagged as urgent.
pub const URGENT_DAYS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Whole days until the target, never negative.
    pub days_left: i64,
    /// Whole days from creation to target, at least 1.
    pub total: i64,
    /// Remaining share in percent, 0..=100.
    pub percent: u8,
    pub urgent: bool,
}

/// Truncate a timestamp to its calendar day in its own time zone.
pub fn start_of_day<Tz: TimeZone>(dt: &DateTime<Tz>) -> NaiveDate {
    dt.date_naive()
}

/// Days from `from` to `to`. Both are already truncated to midnight, so the
/// ceiling of the fractional difference is the plain day difference.
fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

pub fn progress(created: NaiveDate, target: NaiveDate, today: NaiveDate) -> Progress {
    let days_left = days_between(today, target).max(0);
    let total = days_between(created, target).max(1);
    let ratio = days_left as f64 / total as f64;
    let percent = (ratio * 100.0).round().clamp(0.0, 100.0) as u8;
    Progress {
        days_left,
        total,
        percent,
        urgent: days_left <= URGENT_DAYS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_scenario_half_way() {
        let p = progress(d("2024-01-01"), d("2024-01-11"), d("2024-01-06"));
        assert_eq!(p.total, 10);
        assert_eq!(p.days_left, 5);
        assert_eq!(p.percent, 50);
        assert!(p.urgent);
    }

    #[test]
    fn test_same_day_event_floors_total() {
        let p = progress(d("2024-01-01"), d("2024-01-01"), d("2024-01-01"));
        assert_eq!(p.total, 1);
        assert_eq!(p.days_left, 0);
        assert_eq!(p.percent, 0);
    }

    #[test]
    fn test_past_event_has_zero_days_left() {
        let p = progress(d("2024-01-01"), d("2024-01-05"), d("2024-02-01"));
        assert_eq!(p.days_left, 0);
        assert_eq!(p.percent, 0);
        assert!(p.urgent);
    }

    #[test]
    fn test_fresh_event_is_full() {
        let p = progress(d("2024-01-01"), d("2024-03-01"), d("2024-01-01"));
        assert_eq!(p.percent, 100);
        assert!(!p.urgent);
    }

    #[test]
    fn test_today_before_created_clamps_to_full() {
        let p = progress(d("2024-01-10"), d("2024-01-20"), d("2024-01-01"));
        assert_eq!(p.days_left, 19);
        assert_eq!(p.percent, 100);
    }

    #[test]
    fn test_percent_drains_monotonically() {
        let created = d("2024-01-01");
        let target = d("2024-04-09");
        let mut last = 101u8;
        let mut today = created;
        while today <= target {
            let p = progress(created, target, today);
            assert!(p.percent <= 100);
            assert!(p.percent <= last, "percent rose on {}", today);
            last = p.percent;
            today += Duration::days(1);
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn test_rounding_half_up() {
        // 1 of 8 days left = 12.5% -> 13
        let p = progress(d("2024-01-01"), d("2024-01-09"), d("2024-01-08"));
        assert_eq!(p.percent, 13);
    }

    #[test]
    fn test_start_of_day_uses_local_calendar_day() {
        let offset = FixedOffset::east_opt(5 * 3600).unwrap();
        let late_utc = Utc.with_ymd_and_hms(2024, 1, 5, 22, 0, 0).unwrap();
        assert_eq!(start_of_day(&late_utc), d("2024-01-05"));
        assert_eq!(start_of_day(&late_utc.with_timezone(&offset)), d("2024-01-06"));
    }
}
