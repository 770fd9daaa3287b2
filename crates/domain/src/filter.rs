//! In-memory filters backing list views.
//!
//! Filters borrow their input and return the retained items, so they can be
//! recomputed on every change of a search box or a select.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Month, Utc};

use crate::error::DomainError;
use crate::identity::profile::Profile;

/// Sentinel selecting every value.
pub const ALL: &str = "All";

/// English month names, indexed by calendar month minus one.
pub const MONTHS: [&str; 12] = [
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

/// Items carrying the date a [`DateFilter`] looks at.
pub trait Dated {
    fn date(&self) -> DateTime<Utc>;
}

/// Year selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearFilter {
    All,
    Year(i32),
}

impl YearFilter {
    fn matches(&self, year: i32) -> bool {
        match self {
            YearFilter::All => true,
            YearFilter::Year(wanted) => *wanted == year,
        }
    }
}

impl FromStr for YearFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL {
            return Ok(YearFilter::All);
        }
        s.parse()
            .map(YearFilter::Year)
            .map_err(|_| DomainError::InvalidYear)
    }
}

impl fmt::Display for YearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearFilter::All => f.write_str(ALL),
            YearFilter::Year(year) => write!(f, "{year}"),
        }
    }
}

/// Month selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthFilter {
    All,
    Month(Month),
}

impl MonthFilter {
    fn matches(&self, month: u32) -> bool {
        match self {
            MonthFilter::All => true,
            MonthFilter::Month(wanted) => wanted.number_from_month() == month,
        }
    }
}

impl FromStr for MonthFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL {
            return Ok(MonthFilter::All);
        }
        MONTHS
            .iter()
            .position(|name| *name == s)
            .and_then(|index| Month::try_from(index as u8 + 1).ok())
            .map(MonthFilter::Month)
            .ok_or(DomainError::InvalidMonth)
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthFilter::All => f.write_str(ALL),
            MonthFilter::Month(month) => f.write_str(month.name()),
        }
    }
}

/// Year and month filter over dated items. Calendar fields are read in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFilter {
    pub year: YearFilter,
    pub month: MonthFilter,
}

impl DateFilter {
    /// Filter preset to the year and month of `now`.
    pub fn current(now: DateTime<Utc>) -> Self {
        Self {
            year: YearFilter::Year(now.year()),
            month: Month::try_from(now.month() as u8)
                .map_or(MonthFilter::All, MonthFilter::Month),
        }
    }

    /// Build a filter from the raw select values.
    ///
    /// # Errors
    ///
    /// Returns `Err` if either value is neither `All` nor a valid year or
    /// English month name.
    pub fn parse(year: &str, month: &str) -> Result<Self, DomainError> {
        Ok(Self {
            year: year.parse()?,
            month: month.parse()?,
        })
    }

    /// Whether `item` passes both selections.
    pub fn matches<T: Dated>(&self, item: &T) -> bool {
        let date = item.date();
        self.year.matches(date.year()) && self.month.matches(date.month())
    }

    /// Items passing the filter, in input order.
    pub fn apply<'a, T: Dated>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(*item)).collect()
    }
}

/// Profiles whose name or email contains `query`, ignoring case.
pub fn search_profiles<'a>(
    query: &str,
    profiles: &'a [Profile],
) -> Vec<&'a Profile> {
    let query = query.to_lowercase();
    profiles
        .iter()
        .filter(|profile| {
            profile.name.to_lowercase().contains(&query)
                || profile.email.as_str().contains(&query)
        })
        .collect()
}
