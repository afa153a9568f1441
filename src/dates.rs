//! Calendar helpers used to label and bucket daily records.
//!
//! Everything here is a pure function of its inputs except the
//! current-week/current-month tests, which read "today" from a [`Clock`]
//! so they can be pinned in tests.

use chrono::{Datelike, Days, Local, NaiveDate};
use thiserror::Error;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Errors raised while reading a date typed by a user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("date: Required")]
    Missing,
    #[error("date: '{0}' is not a valid YYYY-MM-DD date")]
    Invalid(String),
}

/// Source of "today".
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Reads the local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Parse a required `YYYY-MM-DD` date.
pub fn parse_date(input: Option<&str>) -> Result<NaiveDate, DateError> {
    let raw = input.map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Err(DateError::Missing);
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| DateError::Invalid(raw.to_string()))
}

/// Monday = 1 through Sunday = 7.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

/// Week of the month: days 1-7 are week 1, 8-14 week 2, 15-21 week 3
/// and everything from the 22nd on is week 4.
pub fn month_week_number(date: NaiveDate) -> u8 {
    let week = (date.day() + 6) / 7;
    week.min(4) as u8
}

/// Short label such as `Jan 1`.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Monday and Sunday of the week containing `day`.
pub fn week_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let from_monday = u64::from(day.weekday().num_days_from_monday());
    let monday = day.checked_sub_days(Days::new(from_monday)).unwrap_or(day);
    let sunday = monday.checked_add_days(Days::new(6)).unwrap_or(monday);
    (monday, sunday)
}

pub fn is_in_current_week(date: NaiveDate, clock: &impl Clock) -> bool {
    let (monday, sunday) = week_bounds(clock.today());
    date >= monday && date <= sunday
}

pub fn is_in_current_month(date: NaiveDate, clock: &impl Clock) -> bool {
    let today = clock.today();
    date.year() == today.year() && date.month() == today.month()
}

/// Years offered when picking a period: last year through five years out.
pub fn year_options(clock: &impl Clock) -> Vec<i32> {
    let current = clock.today().year();
    (current - 1..=current + 5).collect()
}

/// A selectable month, e.g. `2025-01` / `January 2025`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MonthOption {
    pub value: String,
    pub label: String,
}

/// Every month from January of `start_year` to December of `end_year`.
///
/// Cloning the iterator restarts it from the clone's position, so a fresh
/// call yields the same sequence every time.
#[derive(Debug, Clone)]
pub struct MonthOptions {
    year: i32,
    month: usize,
    end_year: i32,
    exhausted: bool,
}

impl Iterator for MonthOptions {
    type Item = MonthOption;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted || self.year > self.end_year {
            return None;
        }

        let option = MonthOption {
            value: format!("{}-{:02}", self.year, self.month + 1),
            label: format!("{} {}", MONTH_NAMES[self.month], self.year),
        };

        self.month += 1;
        if self.month == MONTH_NAMES.len() {
            self.month = 0;
            match self.year.checked_add(1) {
                Some(year) => self.year = year,
                None => self.exhausted = true,
            }
        }

        Some(option)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.exhausted || self.year > self.end_year {
            0
        } else {
            let years = i64::from(self.end_year) - i64::from(self.year);
            usize::try_from(years * 12 + (12 - self.month) as i64).unwrap_or(usize::MAX)
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MonthOptions {}

pub fn enumerate_months(start_year: i32, end_year: i32) -> MonthOptions {
    MonthOptions {
        year: start_year,
        month: 0,
        end_year,
        exhausted: false,
    }
}
