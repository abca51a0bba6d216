use std::error::Error;
use std::fmt;

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::util::days_in_year_month;
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParseError {
    value: String,
    expected: &'static str,
}

impl fmt::Display for DateParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid date '{}': expected {}", self.value, self.expected)
    }
}

impl Error for DateParseError {}

pub fn parse_date(raw: &str) -> Result<Date, DateParseError> {
    let trimmed = raw.trim();
    Date::parse(trimmed, format_description!("[year]-[month]-[day]")).map_err(|_| {
        DateParseError {
            value: raw.to_string(),
            expected: "YYYY-MM-DD",
        }
    })
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM`, `YYYY-MM-DD HH:MM:SS` and the
/// same shapes with a `T` separator. A bare date means midnight.
pub fn parse_datetime(raw: &str) -> Result<PrimitiveDateTime, DateParseError> {
    let normalized = raw.trim().replacen('T', " ", 1);
    if let Ok(value) = PrimitiveDateTime::parse(
        &normalized,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Ok(value);
    }
    if let Ok(value) = PrimitiveDateTime::parse(
        &normalized,
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
    ) {
        return Ok(value);
    }
    parse_date(&normalized)
        .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT))
        .map_err(|_| DateParseError {
            value: raw.to_string(),
            expected: "YYYY-MM-DD[ HH:MM[:SS]]",
        })
}

pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .expect("calendar date formatting should never fail")
}

pub fn format_datetime(value: PrimitiveDateTime) -> String {
    value
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .expect("date-time formatting should never fail")
}

pub fn now_utc_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .expect("RFC3339 formatting for UTC timestamp should never fail")
}

pub fn now_datetime() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Every day from `begin` through `end`, inclusive. Empty when `begin > end`.
pub fn days_between(begin: Date, end: Date) -> Vec<Date> {
    let mut days = Vec::new();
    let mut current = begin;
    while current <= end {
        days.push(current);
        match current.next_day() {
            Some(next) => current = next,
            None => break,
        }
    }
    days
}

pub fn add_days(date: Date, days: i64) -> Date {
    date.saturating_add(Duration::days(days))
}

/// Calendar month arithmetic; the day is clamped to the target month's length.
/// `None` when the result falls outside the supported calendar.
pub fn add_months(date: Date, months: i32) -> Option<Date> {
    let total = (date.year() * 12 + (date.month() as i32 - 1)).checked_add(months)?;
    let year = total.div_euclid(12);
    let month = Month::try_from((total.rem_euclid(12) + 1) as u8).ok()?;
    let day = date.day().min(last_day_of_month(year, month)?.day());
    Date::from_calendar_date(year, month, day).ok()
}

pub fn first_day_of_month(date: Date) -> Date {
    date.replace_day(1).unwrap_or(date)
}

pub fn last_day_of_month(year: i32, month: Month) -> Option<Date> {
    Date::from_calendar_date(year, month, days_in_year_month(year, month)).ok()
}

/// Whole years elapsed between `born` and `on`.
pub fn age_on(born: Date, on: Date) -> i32 {
    let mut years = on.year() - born.year();
    if (on.month() as u8, on.day()) < (born.month() as u8, born.day()) {
        years -= 1;
    }
    years
}
