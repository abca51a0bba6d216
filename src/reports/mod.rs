//! Date-bucketed aggregate reports over workers, orders, assignments,
//! sign-ins and activity attendance.
//!
//! The basic functions each run one grouped SQL query and return rows keyed
//! by day (`YYYY-MM-DD`). The summary composers join those rows onto a date
//! range, treating a day with no rows as zero.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use rusqlite::Connection;
use time::Date;

use crate::dates::{days_between, format_date, parse_date, DateParseError};
use crate::lookup_cache::{LookupError, LookupSnapshot};

mod profile;
mod queries;
mod summaries;
pub mod units;

use units::{Period, ReportUnit};

pub struct ReportService<'a> {
    conn: &'a Connection,
    lookups: Arc<LookupSnapshot>,
    rockstar_minutes: i64,
}

impl<'a> ReportService<'a> {
    pub fn new(conn: &'a Connection, lookups: Arc<LookupSnapshot>, rockstar_minutes: i64) -> Self {
        Self {
            conn,
            lookups,
            rockstar_minutes,
        }
    }

    pub fn rockstar_minutes(&self) -> i64 {
        self.rockstar_minutes
    }
}

/// Every day from `begin` through `end`. A reversed range is an error.
pub fn date_range(begin: Date, end: Date) -> Result<Vec<Date>, ReportError> {
    if begin > end {
        return Err(ReportError::InvalidRange {
            begin: format_date(begin),
            end: format_date(end),
        });
    }
    Ok(days_between(begin, end))
}

pub fn parse_range(begin: &str, end: &str) -> Result<(Date, Date), ReportError> {
    let begin = parse_date(begin)?;
    let end = parse_date(end)?;
    date_range(begin, end)?;
    Ok((begin, end))
}

/// Two-decimal rounding with midpoints away from zero.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn average(total: f64, hours: i64) -> f64 {
    if hours == 0 {
        0.0
    } else {
        round2(total / hours as f64)
    }
}

/// Index of dated counts for zero-filling a range.
pub(crate) fn counts_by_date(units: &[ReportUnit]) -> HashMap<&str, i64> {
    let mut index = HashMap::new();
    for unit in units {
        if let Some(date) = unit.date.as_deref() {
            *index.entry(date).or_insert(0) += unit.count;
        }
    }
    index
}

#[derive(Debug)]
pub enum ReportError {
    Db(rusqlite::Error),
    Lookup(LookupError),
    Date(DateParseError),
    InvalidRange { begin: String, end: String },
    OutOfCalendar(String),
    InvalidReportType(String),
    InvalidPeriod(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Db(err) => write!(f, "database error: {}", err),
            ReportError::Lookup(err) => write!(f, "{}", err),
            ReportError::Date(err) => write!(f, "{}", err),
            ReportError::InvalidRange { begin, end } => {
                write!(f, "begin date {} is after end date {}", begin, end)
            }
            ReportError::OutOfCalendar(date) => {
                write!(f, "report window around {} leaves the supported calendar", date)
            }
            ReportError::InvalidReportType(_) => {
                write!(f, "Report type must be \"weekly\", \"monthly\" or \"yearly\".")
            }
            ReportError::InvalidPeriod(value) => write!(
                f,
                "unknown period '{}': expected one of {}",
                value,
                Period::ALL
                    .iter()
                    .map(|period| period.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

impl Error for ReportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ReportError::Db(err) => Some(err),
            ReportError::Lookup(err) => Some(err),
            ReportError::Date(err) => Some(err),
            ReportError::InvalidRange { .. }
            | ReportError::OutOfCalendar(_)
            | ReportError::InvalidReportType(_)
            | ReportError::InvalidPeriod(_) => None,
        }
    }
}

impl From<rusqlite::Error> for ReportError {
    fn from(value: rusqlite::Error) -> Self {
        ReportError::Db(value)
    }
}

impl From<LookupError> for ReportError {
    fn from(value: LookupError) -> Self {
        ReportError::Lookup(value)
    }
}

impl From<DateParseError> for ReportError {
    fn from(value: DateParseError) -> Self {
        ReportError::Date(value)
    }
}

#[cfg(test)]
mod tests;
