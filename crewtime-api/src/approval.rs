//! Week arithmetic and approval-window summaries.
//!
//! Weeks run Monday through Sunday. Every approval and lock check is
//! anchored on the Monday of the target week, so any date inside the
//! week can be handed in and normalized.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;
use ts_rs::TS;

use crate::models::TimeEntry;

/// Normalizes any date to the Monday of its week.
pub fn week_start_for(date: NaiveDate) -> NaiveDate {
    let days_from_monday = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(days_from_monday)
}

/// The seven dates of the week anchored at `week_start`.
pub fn week_dates(week_start: NaiveDate) -> [NaiveDate; 7] {
    let mut days = [week_start; 7];
    for (i, d) in days.iter_mut().enumerate() {
        *d = week_start + Duration::days(i as i64);
    }
    days
}

/// Exclusive upper bound of the week, for range queries.
pub fn week_end_exclusive(week_start: NaiveDate) -> NaiveDate {
    week_start + Duration::days(7)
}

/// Per-day hours within one approval window, plus the advisory
/// completeness flag the review screen shows before sign-off.
#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct WeekSummary {
    #[ts(type = "string")]
    pub week_start: NaiveDate,
    pub total_hours: f64,
    /// Seven entries, Monday first.
    pub daily_hours: Vec<DayHours>,
    /// True when every weekday (Mon-Fri) has nonzero hours. Advisory
    /// only: approval of an incomplete or even empty week is allowed.
    pub complete: bool,
    #[ts(type = "Array<string>")]
    pub missing_weekdays: Vec<NaiveDate>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct DayHours {
    #[ts(type = "string")]
    pub date: NaiveDate,
    pub hours: f64,
}

/// Summarizes a worker/job week from its time entries. Entries outside
/// the window are the caller's bug and are ignored here.
pub fn summarize_week(week_start: NaiveDate, entries: &[TimeEntry]) -> WeekSummary {
    let days = week_dates(week_start);
    let daily_hours: Vec<DayHours> = days
        .iter()
        .map(|&date| DayHours {
            date,
            hours: entries
                .iter()
                .filter(|e| e.entry_date == date)
                .map(|e| e.hours)
                .sum(),
        })
        .collect();

    let total_hours = daily_hours.iter().map(|d| d.hours).sum();
    let missing_weekdays: Vec<NaiveDate> = daily_hours
        .iter()
        .filter(|d| d.date.weekday() != Weekday::Sat && d.date.weekday() != Weekday::Sun)
        .filter(|d| d.hours == 0.0)
        .map(|d| d.date)
        .collect();

    WeekSummary {
        week_start,
        total_hours,
        complete: missing_weekdays.is_empty(),
        daily_hours,
        missing_weekdays,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(entry_date: NaiveDate, hours: f64) -> TimeEntry {
        let created: NaiveDateTime = entry_date.and_hms_opt(8, 0, 0).unwrap();
        TimeEntry {
            id: 0,
            worker_id: 1,
            job_id: 1,
            labor_activity_id: 1,
            entry_date,
            hours,
            notes: None,
            approved: false,
            approved_by: None,
            approved_at: None,
            created_at: created,
        }
    }

    #[test]
    fn test_week_start_normalizes_to_monday() {
        // 2025-06-02 is a Monday.
        let monday = date(2025, 6, 2);
        assert_eq!(week_start_for(monday), monday);
        assert_eq!(week_start_for(date(2025, 6, 4)), monday); // Wednesday
        assert_eq!(week_start_for(date(2025, 6, 8)), monday); // Sunday
        assert_eq!(week_start_for(date(2025, 6, 9)), date(2025, 6, 9)); // next Monday
    }

    #[test]
    fn test_week_dates_span_seven_days() {
        let days = week_dates(date(2025, 6, 2));
        assert_eq!(days[0], date(2025, 6, 2));
        assert_eq!(days[6], date(2025, 6, 8));
        assert_eq!(week_end_exclusive(date(2025, 6, 2)), date(2025, 6, 9));
    }

    #[test]
    fn test_summarize_full_week_is_complete() {
        let monday = date(2025, 6, 2);
        let entries: Vec<TimeEntry> = (0..5)
            .map(|i| entry(monday + Duration::days(i), 8.0))
            .collect();
        let summary = summarize_week(monday, &entries);
        assert!(summary.complete);
        assert_eq!(summary.total_hours, 40.0);
        assert!(summary.missing_weekdays.is_empty());
        assert_eq!(summary.daily_hours.len(), 7);
        assert_eq!(summary.daily_hours[5].hours, 0.0); // Saturday
    }

    #[test]
    fn test_missing_weekday_flags_incomplete() {
        let monday = date(2025, 6, 2);
        // Wednesday absent.
        let entries = vec![
            entry(monday, 8.0),
            entry(date(2025, 6, 3), 8.0),
            entry(date(2025, 6, 5), 8.0),
            entry(date(2025, 6, 6), 8.0),
        ];
        let summary = summarize_week(monday, &entries);
        assert!(!summary.complete);
        assert_eq!(summary.missing_weekdays, vec![date(2025, 6, 4)]);
        assert_eq!(summary.total_hours, 32.0);
    }

    #[test]
    fn test_weekend_hours_count_without_affecting_completeness() {
        let monday = date(2025, 6, 2);
        let entries = vec![entry(date(2025, 6, 7), 4.0)]; // Saturday only
        let summary = summarize_week(monday, &entries);
        assert!(!summary.complete);
        assert_eq!(summary.missing_weekdays.len(), 5);
        assert_eq!(summary.total_hours, 4.0);
    }

    #[test]
    fn test_multiple_entries_same_day_accumulate() {
        let monday = date(2025, 6, 2);
        let entries = vec![entry(monday, 4.0), entry(monday, 3.5)];
        let summary = summarize_week(monday, &entries);
        assert_eq!(summary.daily_hours[0].hours, 7.5);
    }
}
