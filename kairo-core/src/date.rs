//! Date parsing and formatting
//!
//! Task dates are stored as month/day/year strings without zero padding
//! ("1/25/2026"). User input accepts the friendlier forms:
//! - ISO dates: "2026-01-25"
//! - Locale dates: "1/25/2026"
//! - Human dates: "Jan 25", "January 25 2026"
//! - Relative: "today", "tomorrow", "monday", "next friday"
//! - Offset: "in 3 days", "in 1 week"

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};

use crate::error::{CoreError, Result};

/// Format used for every stored date
const LOCALE_FORMAT: &str = "%-m/%-d/%Y";

/// Format a date the way tasks store it ("M/D/YYYY", no padding)
pub fn format_locale_date(date: NaiveDate) -> String {
    date.format(LOCALE_FORMAT).to_string()
}

/// Today's date in stored form
pub fn today_locale() -> String {
    format_locale_date(Local::now().date_naive())
}

/// Read a stored date string back into a date
///
/// Returns `None` for anything that is not a stored date. Callers treat that
/// as "no date" rather than an error.
pub fn parse_locale_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(input, "%m/%d/%Y")
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .ok()
}

/// Parse user input into a NaiveDate
///
/// Supports multiple formats:
/// - ISO: "2026-01-25"
/// - Locale: "1/25/2026"
/// - Human: "Jan 25", "January 25", "Jan 25 2026"
/// - Relative: "today", "tomorrow"
/// - Weekdays: "monday", "tuesday", etc. (next occurrence)
/// - Prefixed: "next monday", "next friday"
/// - Offset: "in 3 days", "in 1 week", "in 2 weeks"
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim().to_lowercase();

    if let Some(date) = try_parse_relative(&input) {
        return Ok(date);
    }

    if let Some(date) = try_parse_weekday(&input) {
        return Ok(date);
    }

    if let Some(date) = try_parse_offset(&input) {
        return Ok(date);
    }

    if let Some(date) = parse_locale_date(&input) {
        return Ok(date);
    }

    let with_year = [
        "%b %d %Y", // Jan 25 2026
        "%B %d %Y", // January 25 2026
        "%d %b %Y", // 25 Jan 2026
        "%d %B %Y", // 25 January 2026
    ];

    for format in &with_year {
        if let Ok(date) = NaiveDate::parse_from_str(&input, format) {
            return Ok(date);
        }
    }

    // chrono refuses to build a date without a year, so supply this one and
    // roll forward if it already passed.
    let today = Local::now().date_naive();
    let without_year = ["%b %d", "%B %d", "%m/%d"];
    let dated = format!("{} {}", input, today.year());
    for format in &without_year {
        let format = format!("{} %Y", format);
        if let Ok(date) = NaiveDate::parse_from_str(&dated, &format) {
            if date < today {
                return date
                    .with_year(today.year() + 1)
                    .ok_or_else(|| CoreError::parse("Invalid date"));
            }
            return Ok(date);
        }
    }

    Err(CoreError::parse(format!(
        "Could not parse date '{}'. Try formats like: 'tomorrow', 'Jan 25', '2026-01-25', '1/25/2026', 'next monday', 'in 3 days'",
        input
    )))
}

fn try_parse_relative(input: &str) -> Option<NaiveDate> {
    let today = Local::now().date_naive();

    match input {
        "today" => Some(today),
        "tomorrow" => today.checked_add_days(Days::new(1)),
        "yesterday" => today.checked_sub_days(Days::new(1)),
        _ => None,
    }
}

fn try_parse_weekday(input: &str) -> Option<NaiveDate> {
    let today = Local::now().date_naive();
    let weekday_str = input.strip_prefix("next ").unwrap_or(input);

    let target_weekday = match weekday_str {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thur" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };

    // Always the next occurrence, never today
    let days = (target_weekday.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64
        + 7)
        % 7;
    let days_until = if days == 0 { 7 } else { days as u64 };

    today.checked_add_days(Days::new(days_until))
}

fn try_parse_offset(input: &str) -> Option<NaiveDate> {
    let today = Local::now().date_naive();

    let rest = input.strip_prefix("in ")?.trim();
    let parts: Vec<&str> = rest.split_whitespace().collect();

    if parts.len() != 2 {
        return None;
    }

    let num: u64 = parts[0].parse().ok()?;

    match parts[1] {
        "day" | "days" => today.checked_add_days(Days::new(num)),
        "week" | "weeks" => today.checked_add_days(Days::new(num.checked_mul(7)?)),
        _ => None,
    }
}

/// Format a NaiveDate for human-readable display
///
/// Returns strings like: "Today", "Tomorrow", "Mon Jan 27", "Overdue (3 days ago)"
pub fn format_date_human(date: NaiveDate, relative_to_today: bool) -> String {
    if !relative_to_today {
        return format_locale_date(date);
    }

    let today = Local::now().date_naive();
    let diff = date.signed_duration_since(today).num_days();

    match diff {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        2..=6 => date.format("%a %b %d").to_string(),
        7..=365 => date.format("%b %d").to_string(),
        _ if diff < 0 => format!("Overdue ({} days ago)", -diff),
        _ => format_locale_date(date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_locale_format_is_unpadded() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(format_locale_date(date), "1/5/2024");
    }

    #[test]
    fn test_parse_locale_date() {
        assert_eq!(
            parse_locale_date("1/5/2024"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(
            parse_locale_date("12/31/2023"),
            NaiveDate::from_ymd_opt(2023, 12, 31)
        );
        assert_eq!(parse_locale_date(""), None);
        assert_eq!(parse_locale_date("not a date"), None);
    }

    #[test]
    fn test_huge_week_offset_is_rejected() {
        assert!(parse_date("in 3000000000000000000 weeks").is_err());
        assert!(parse_date("in 18446744073709551615 days").is_err());
    }

    #[test]
    fn test_parse_today_tomorrow() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date("today").unwrap(), today);
        assert_eq!(parse_date("tomorrow").unwrap(), today + Duration::days(1));
    }

    #[test]
    fn test_parse_iso_and_locale_date() {
        let expected = NaiveDate::from_ymd_opt(2026, 1, 25).unwrap();
        assert_eq!(parse_date("2026-01-25").unwrap(), expected);
        assert_eq!(parse_date("1/25/2026").unwrap(), expected);
    }

    #[test]
    fn test_parse_human_date_with_year() {
        assert_eq!(
            parse_date("Jan 25 2026").unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 25).unwrap()
        );
    }

    #[test]
    fn test_parse_human_date_without_year_is_not_in_past() {
        let date = parse_date("Jan 1").unwrap();
        assert!(date >= Local::now().date_naive());
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 1);
    }

    #[test]
    fn test_parse_next_weekday() {
        let date = parse_date("next friday").unwrap();
        assert_eq!(date.weekday(), Weekday::Fri);
        assert!(date > Local::now().date_naive());
    }

    #[test]
    fn test_parse_offset() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date("in 3 days").unwrap(), today + Duration::days(3));
        assert_eq!(parse_date("in 2 weeks").unwrap(), today + Duration::days(14));
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_date("someday maybe").is_err());
    }

    #[test]
    fn test_format_date_human() {
        let today = Local::now().date_naive();
        assert_eq!(format_date_human(today, true), "Today");
        assert_eq!(
            format_date_human(today + Duration::days(1), true),
            "Tomorrow"
        );
        assert_eq!(format_date_human(today, false), format_locale_date(today));
    }
}
