//! Day stamps: `yyyy-mm-dd` strings naming a local calendar day.
//!
//! Journal documents are keyed by stamp and item `completed` fields hold one.
//! Stamps compare and sort as strings, which is what lets "completed in year
//! Y" be a simple range query.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Days, FixedOffset, NaiveDate, TimeZone};

use crate::model::ModelError;

/// A local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stamp(NaiveDate);

impl Stamp {
    /// Builds a stamp from calendar fields. Returns `None` for impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Stamp)
    }

    /// Parses `yyyy-mm-dd`. Components may omit zero padding (`2024-3-1`).
    pub fn parse(text: &str) -> Result<Self, ModelError> {
        let invalid = || ModelError::InvalidStamp {
            stamp: text.to_string(),
        };
        let mut parts = text.split('-');
        let (Some(y), Some(m), Some(d), None) = (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !(digits(y) && digits(m) && digits(d)) {
            return Err(invalid());
        }
        let year = y.parse().map_err(|_| invalid())?;
        let month = m.parse().map_err(|_| invalid())?;
        let day = d.parse().map_err(|_| invalid())?;
        Self::from_ymd(year, month, day).ok_or_else(invalid)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The stamp `days` away (negative rolls backwards). Saturates at the
    /// calendar limits.
    pub fn add_days(&self, days: i64) -> Self {
        let shifted = if days >= 0 {
            self.0.checked_add_days(Days::new(days as u64))
        } else {
            self.0.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        Stamp(shifted.unwrap_or(self.0))
    }

    /// Milliseconds since the epoch of local midnight starting this day.
    pub fn midnight_millis(&self, offset: FixedOffset) -> i64 {
        let midnight = self.0.and_hms_opt(0, 0, 0).unwrap_or_default();
        offset
            .from_local_datetime(&midnight)
            .single()
            .map(|dt| dt.timestamp_millis())
            .unwrap_or_else(|| midnight.and_utc().timestamp_millis())
    }

    /// First day of `year`, used as an inclusive query bound.
    pub fn year_start(year: i32) -> Option<Self> {
        Self::from_ymd(year, 1, 1)
    }
}

impl From<NaiveDate> for Stamp {
    fn from(date: NaiveDate) -> Self {
        Stamp(date)
    }
}

impl FromStr for Stamp {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stamp::parse(s)
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }
}
