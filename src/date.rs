//! Calendar dates and the day-by-day sequence an agenda covers
//!
//! Start dates can be given as expressions (`today`, ISO or day-first dates).
//! "Today" is resolved in an explicit time zone so the rest of the pipeline
//! only ever sees an already-resolved [`CalendarDate`].

use std::fmt;
use std::iter::FusedIterator;

use chrono::{Datelike, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use crate::error::{Error, Result};

/// Time zone used to decide what "today" means when none is configured
pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::Europe::Paris;

/// A plain (year, month, day) value with calendar arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Build a date, rejecting impossible combinations such as February 30
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| {
                Error::InvalidDateExpression(format!(
                    "{:04}-{:02}-{:02} is not a calendar date",
                    year, month, day
                ))
            })
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month number, 1-12
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Day of month, 1-31
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// The next calendar day, rolling over months, years and leap days.
    /// `None` only at the end of the representable range.
    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// December 31 of this date's year
    pub fn year_end(&self) -> Self {
        Self(NaiveDate::from_ymd_opt(self.year(), 12, 31).unwrap_or(NaiveDate::MAX))
    }

    /// Signed number of days from `self` to `other`
    pub fn days_until(&self, other: &CalendarDate) -> i64 {
        (other.0 - self.0).num_days()
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// An inclusive run of consecutive days
///
/// A range whose start lies after its end is empty. The range itself is a
/// small `Copy` value, so iterating it again starts over from `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: CalendarDate,
    end: CalendarDate,
}

impl DateRange {
    pub fn new(start: CalendarDate, end: CalendarDate) -> Self {
        Self { start, end }
    }

    /// Every day from `start` through December 31 of the same year
    pub fn through_year_end(start: CalendarDate) -> Self {
        Self::new(start, start.year_end())
    }

    pub fn start(&self) -> CalendarDate {
        self.start
    }

    pub fn end(&self) -> CalendarDate {
        self.end
    }

    /// Number of days in the range (0 when start > end)
    pub fn len(&self) -> usize {
        usize::try_from(self.start.days_until(&self.end) + 1).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn iter(&self) -> DateIter {
        DateIter {
            next: (!self.is_empty()).then_some(self.start),
            end: self.end,
        }
    }
}

impl IntoIterator for DateRange {
    type Item = CalendarDate;
    type IntoIter = DateIter;

    fn into_iter(self) -> DateIter {
        self.iter()
    }
}

impl IntoIterator for &DateRange {
    type Item = CalendarDate;
    type IntoIter = DateIter;

    fn into_iter(self) -> DateIter {
        self.iter()
    }
}

/// Lazy day-by-day iterator over a [`DateRange`]
#[derive(Debug, Clone)]
pub struct DateIter {
    next: Option<CalendarDate>,
    end: CalendarDate,
}

impl Iterator for DateIter {
    type Item = CalendarDate;

    fn next(&mut self) -> Option<CalendarDate> {
        let current = self.next?;
        self.next = current.succ().filter(|next| *next <= self.end);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .next
            .map_or(0, |next| DateRange::new(next, self.end).len());
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DateIter {}

impl FusedIterator for DateIter {}

/// How the agenda's first day is specified
#[derive(Debug, Clone, PartialEq)]
pub enum DateExpression {
    /// Use today's date in the configured time zone
    Today,
    /// Use an explicit date
    Explicit(CalendarDate),
}

/// Parse a start-date expression
///
/// Supported formats:
/// - `""` (empty), `"today"`, `"hoy"` → Today
/// - `"2025-08-28"` → Explicit date (ISO format)
/// - `"28/08/2025"` → Explicit date (day-first format)
pub fn parse_date_expression(expr: &str) -> Result<DateExpression> {
    let expr = expr.trim();

    if expr.is_empty() || expr.eq_ignore_ascii_case("today") || expr.eq_ignore_ascii_case("hoy") {
        return Ok(DateExpression::Today);
    }

    if let Ok(date) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        return Ok(DateExpression::Explicit(date.into()));
    }

    if let Ok(date) = NaiveDate::parse_from_str(expr, "%d/%m/%Y") {
        return Ok(DateExpression::Explicit(date.into()));
    }

    Err(Error::InvalidDateExpression(format!("Unable to parse date expression: {}", expr)))
}

/// Parse an IANA time zone name such as `Europe/Paris`
pub fn parse_time_zone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| Error::InvalidTimeZone(format!("{}: {}", name, e)))
}

/// Today's date as seen from `tz`
pub fn today_in(tz: Tz) -> CalendarDate {
    Utc::now().with_timezone(&tz).date_naive().into()
}

/// Resolve a DateExpression to an actual date
pub fn resolve_date(expr: &DateExpression, tz: Tz) -> CalendarDate {
    match expr {
        DateExpression::Today => today_in(tz),
        DateExpression::Explicit(date) => *date,
    }
}
