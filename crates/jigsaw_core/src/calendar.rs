use core::fmt::{self, Display, Formatter};
use core::str::FromStr;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::PuzzleError;

const FORMAT: &str = "%Y-%m-%d";
/// Years that print as exactly four digits and parse back unchanged.
const YEARS: core::ops::RangeInclusive<i32> = 0..=9999;

/// A UTC calendar date, stored and shown as `YYYY-MM-DD`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, PuzzleError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(Self::checked)
            .ok_or_else(|| PuzzleError::InvalidDay(format!("{year:04}-{month:02}-{day:02}")))
    }

    pub fn today() -> Self {
        Self(Utc::now().date_naive())
    }

    /// The following day. The last representable day is its own successor.
    pub fn next(self) -> Self {
        self.0.succ_opt().and_then(Self::checked).unwrap_or(self)
    }

    fn checked(date: NaiveDate) -> Option<Self> {
        YEARS.contains(&date.year()).then_some(Self(date))
    }
}

impl Display for CalendarDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

impl FromStr for CalendarDay {
    type Err = PuzzleError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(text, FORMAT)
            .ok()
            .and_then(Self::checked)
            .ok_or_else(|| PuzzleError::InvalidDay(text.to_owned()))
    }
}

impl TryFrom<String> for CalendarDay {
    type Error = PuzzleError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<CalendarDay> for String {
    fn from(day: CalendarDay) -> Self {
        day.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(text: &str) -> CalendarDay {
        text.parse().expect("valid day")
    }

    #[test]
    fn next_rolls_over_months_and_years() {
        assert_eq!(day("2024-02-28").next(), day("2024-02-29"), "leap day");
        assert_eq!(day("2023-02-28").next(), day("2023-03-01"), "no leap day");
        assert_eq!(day("2025-04-30").next(), day("2025-05-01"), "30 day month");
        assert_eq!(day("2025-12-31").next(), day("2026-01-01"), "new year");
        assert_eq!(day("9999-12-31").next(), day("9999-12-31"), "last day");
    }

    #[test]
    fn rejects_malformed_days() {
        for text in [
            "2025-13-01",
            "2025-02-30",
            "yesterday",
            "2025-1",
            "",
            "4294967295-01-01",
            "-001-01-01",
            "+10000-01-01",
        ] {
            assert!(text.parse::<CalendarDay>().is_err(), "{text:?} should be rejected");
        }
        assert!(CalendarDay::new(-1, 1, 1).is_err(), "negative year");
        assert_eq!(day("2025-03-07").to_string(), "2025-03-07", "zero padded");
    }

    #[test]
    fn every_accepted_day_survives_a_save() {
        for text in ["0000-01-01", "0042-06-15", "2000-02-29", "9999-12-31"] {
            let json = serde_json::to_string(&day(text)).expect("serializes");
            let loaded: CalendarDay = serde_json::from_str(&json).expect("reloads");
            assert_eq!(loaded, day(text), "{text} round trips");
        }
        let today = CalendarDay::today();
        assert_eq!(day(&today.to_string()), today, "today reloads");
    }
}
