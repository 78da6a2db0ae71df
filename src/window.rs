// Time window derivation: date + timeframe selector -> (start, end) instants.

use chrono::{DateTime, Datelike, Duration as ChronoDuration, NaiveDate, NaiveDateTime, Utc};

use crate::error::PlanError;
use crate::models::Timeframe;

/// Inclusive window over which providers are queried. Always UTC, always
/// whole-second precision, with the end pinned at 23:59:59 rather than a
/// half-open midnight (upstream event services require exactly this shape).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn start_iso(&self) -> String {
        iso_no_ms(self.start)
    }

    pub fn end_iso(&self) -> String {
        iso_no_ms(self.end)
    }
}

/// Format an instant as ISO-8601 UTC without fractional seconds,
/// e.g. `2025-10-25T04:00:00Z`.
pub fn iso_no_ms(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Derive the query window from a date and timeframe selector.
///
/// `custom` requires both explicit bounds; every other timeframe derives its
/// bounds from `date` alone. All failures are client errors.
pub fn build_window(
    date: &str,
    timeframe: Timeframe,
    range_start: Option<&str>,
    range_end: Option<&str>,
) -> Result<TimeWindow, PlanError> {
    if timeframe == Timeframe::Custom {
        let (start, end) = match (range_start, range_end) {
            (Some(s), Some(e)) => (parse_instant(s)?, parse_instant(e)?),
            _ => {
                return Err(PlanError::InvalidRequest(
                    "custom timeframe requires rangeStart and rangeEnd".to_string(),
                ))
            }
        };
        return Ok(TimeWindow { start, end });
    }

    let base = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| PlanError::InvalidRequest(format!("invalid date: {date}")))?;

    match timeframe {
        Timeframe::Day => Ok(day_window(base)),
        Timeframe::Weekend => {
            // Next Saturday on/after the date (0 days forward if it already
            // is one), through the following Sunday.
            let dow = base.weekday().num_days_from_monday(); // Mon=0..Sun=6
            let days_to_sat = (5 + 7 - dow) % 7;
            let sat = base + ChronoDuration::days(i64::from(days_to_sat));
            let sun = sat + ChronoDuration::days(1);
            Ok(TimeWindow {
                start: start_of_day(sat),
                end: end_of_day(sun),
            })
        }
        Timeframe::Week => {
            // ISO week: Monday on/before the date through Sunday.
            let dow = base.weekday().num_days_from_monday();
            let monday = base - ChronoDuration::days(i64::from(dow));
            let sunday = monday + ChronoDuration::days(6);
            Ok(TimeWindow {
                start: start_of_day(monday),
                end: end_of_day(sunday),
            })
        }
        Timeframe::Custom => unreachable!("handled above"),
    }
}

fn day_window(date: NaiveDate) -> TimeWindow {
    TimeWindow {
        start: start_of_day(date),
        end: end_of_day(date),
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc()
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(23, 59, 59)
        .expect("23:59:59 is always valid")
        .and_utc()
}

/// Accepts RFC3339, a bare `YYYY-MM-DDTHH:MM:SS`, or a bare date (treated as
/// midnight). Everything is normalized to UTC with whole-second precision.
fn parse_instant(raw: &str) -> Result<DateTime<Utc>, PlanError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(start_of_day(date));
    }
    Err(PlanError::InvalidRequest(format!("invalid instant: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_window_spans_midnight_to_last_second() {
        let w = build_window("2025-10-25", Timeframe::Day, None, None).unwrap();
        assert_eq!(w.start_iso(), "2025-10-25T00:00:00Z");
        assert_eq!(w.end_iso(), "2025-10-25T23:59:59Z");
    }

    #[test]
    fn weekend_from_monday_finds_next_saturday() {
        // 2025-10-20 is a Monday.
        let w = build_window("2025-10-20", Timeframe::Weekend, None, None).unwrap();
        assert_eq!(w.start_iso(), "2025-10-25T00:00:00Z");
        assert_eq!(w.end_iso(), "2025-10-26T23:59:59Z");
    }

    #[test]
    fn weekend_on_saturday_starts_same_day() {
        // 2025-10-25 is a Saturday.
        let w = build_window("2025-10-25", Timeframe::Weekend, None, None).unwrap();
        assert_eq!(w.start_iso(), "2025-10-25T00:00:00Z");
        assert_eq!(w.end_iso(), "2025-10-26T23:59:59Z");
    }

    #[test]
    fn week_snaps_to_iso_monday() {
        // 2025-10-22 is a Wednesday; its ISO week runs 10-20 through 10-26.
        let w = build_window("2025-10-22", Timeframe::Week, None, None).unwrap();
        assert_eq!(w.start_iso(), "2025-10-20T00:00:00Z");
        assert_eq!(w.end_iso(), "2025-10-26T23:59:59Z");
    }

    #[test]
    fn custom_requires_both_bounds() {
        let err = build_window(
            "2025-10-25",
            Timeframe::Custom,
            Some("2025-10-25T10:00:00Z"),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PlanError::InvalidRequest(_)));
    }

    #[test]
    fn custom_passes_bounds_through_normalized() {
        let w = build_window(
            "2025-10-25",
            Timeframe::Custom,
            Some("2025-10-25T10:00:00-04:00"),
            Some("2025-10-25T18:00:00-04:00"),
        )
        .unwrap();
        assert_eq!(w.start_iso(), "2025-10-25T14:00:00Z");
        assert_eq!(w.end_iso(), "2025-10-25T22:00:00Z");
    }

    #[test]
    fn formatting_never_emits_subseconds() {
        let w = build_window(
            "2025-10-25",
            Timeframe::Custom,
            Some("2025-10-25T10:00:00.123Z"),
            Some("2025-10-25T18:00:00.999Z"),
        )
        .unwrap();
        assert_eq!(w.start_iso(), "2025-10-25T10:00:00Z");
        assert_eq!(w.end_iso(), "2025-10-25T18:00:00Z");
    }

    #[test]
    fn invalid_date_is_a_client_error() {
        let err = build_window("not-a-date", Timeframe::Day, None, None).unwrap_err();
        assert!(matches!(err, PlanError::InvalidRequest(_)));
    }
}
