//! Timestamp conventions of the events timeline.
//!
//! Storage keeps `YYYY-MM-DD HH:MM:SS`; the list/create wire format is the
//! day only, `YYYY/MM/DD`, read as midnight.

use chrono::{Local, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::errors::{DomainError, Result};

pub const WIRE_DAY_FORMAT: &str = "%Y/%m/%d";
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Width of one listing page, counted back from the cutoff.
pub const WINDOW_MONTHS: u32 = 6;

pub fn parse_wire_day(raw: &str) -> Result<NaiveDateTime> {
    NaiveDate::parse_from_str(raw.trim(), WIRE_DAY_FORMAT)
        .map(|d| d.and_time(NaiveTime::default()))
        .map_err(|_| DomainError::Validation(format!("malformed day {raw:?}")))
}

pub fn parse_storage(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), STORAGE_FORMAT)
        .map_err(|_| DomainError::Validation(format!("malformed timestamp {raw:?}")))
}

/// Accepts either the day format or the full storage format.
pub fn parse_any(raw: &str) -> Result<NaiveDateTime> {
    parse_wire_day(raw).or_else(|_| parse_storage(raw))
}

pub fn format_wire_day(time: &NaiveDateTime) -> String {
    time.format(WIRE_DAY_FORMAT).to_string()
}

pub fn format_storage(time: &NaiveDateTime) -> String {
    time.format(STORAGE_FORMAT).to_string()
}

/// Local server time truncated to whole seconds.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Half-open `[from, until)` range covered by one listing call.
///
/// Month arithmetic clamps to the end of shorter months, so the window
/// before 2024-08-31 starts at 2024-02-29.
pub fn window_before(until: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let from = until
        .checked_sub_months(Months::new(WINDOW_MONTHS))
        .unwrap_or(NaiveDateTime::MIN);
    (from, until)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        parse_storage(s).unwrap()
    }

    #[test]
    fn day_input_means_midnight() {
        assert_eq!(parse_wire_day("2024/03/05").unwrap(), at("2024-03-05 00:00:00"));
    }

    #[test]
    fn parse_any_accepts_both_formats() {
        assert_eq!(parse_any("2024/03/05").unwrap(), at("2024-03-05 00:00:00"));
        assert_eq!(parse_any("2024-03-05 12:30:00").unwrap(), at("2024-03-05 12:30:00"));
        assert!(parse_any("05.03.2024").is_err());
    }

    #[test]
    fn wire_output_drops_time_of_day() {
        assert_eq!(format_wire_day(&at("2024-03-05 23:59:59")), "2024/03/05");
        assert_eq!(format_storage(&at("2024-03-05 23:59:59")), "2024-03-05 23:59:59");
    }

    #[test]
    fn window_spans_six_calendar_months() {
        let (from, until) = window_before(at("2024-07-15 10:00:00"));
        assert_eq!(from, at("2024-01-15 10:00:00"));
        assert_eq!(until, at("2024-07-15 10:00:00"));
    }

    #[test]
    fn window_clamps_to_month_end() {
        let (from, _) = window_before(at("2024-08-31 00:00:00"));
        assert_eq!(from, at("2024-02-29 00:00:00"));
    }

    #[test]
    fn now_has_no_subsecond_part() {
        assert_eq!(now().nanosecond(), 0);
    }
}
