//! Calendar months as used by the rankings tables.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::error::{RankingError, Result};

pub const MONTH_NAMES: [&str; 12] = [
    "JANUARY", "FEBRUARY", "MARCH", "APRIL", "MAY", "JUNE",
    "JULY", "AUGUST", "SEPTEMBER", "OCTOBER", "NOVEMBER", "DECEMBER",
];

/// Looks up the month number (1-12) for an English month name, any case.
pub fn month_number(name: &str) -> Option<u32> {
    let upper = name.trim().to_uppercase();
    MONTH_NAMES
        .iter()
        .position(|m| *m == upper)
        .map(|idx| idx as u32 + 1)
}

/// A calendar month. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(RankingError::Date {
                value: format!("{year}-{month:02}"),
                message: "month out of range".to_string(),
            });
        }
        Ok(Self { year, month })
    }

    pub fn from_name(year: i32, name: &str) -> Result<Self> {
        let month = month_number(name).ok_or_else(|| RankingError::Date {
            value: name.to_string(),
            message: "unknown month name".to_string(),
        })?;
        Self::new(year, month)
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// Previous month without leaving the calendar year.
    pub fn prev_in_year(&self) -> Option<Self> {
        (self.month > 1).then(|| Self { year: self.year, month: self.month - 1 })
    }

    pub fn first_day(&self) -> NaiveDate {
        // year/month were validated on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Every month from `self` to `last`, both inclusive.
    pub fn through(self, last: YearMonth) -> impl Iterator<Item = YearMonth> {
        std::iter::successors(Some(self), |m| Some(m.next())).take_while(move |m| *m <= last)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

// Accepts "2013-03"
impl FromStr for YearMonth {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self> {
        let bad = |message: &str| RankingError::Date {
            value: s.to_string(),
            message: message.to_string(),
        };

        let (year, month) = s.trim().split_once('-').ok_or_else(|| bad("expected YYYY-MM"))?;
        let year: i32 = year.parse().map_err(|_| bad("invalid year"))?;
        let month: u32 = month.parse().map_err(|_| bad("invalid month"))?;
        Self::new(year, month)
    }
}

pub fn parse_date(value: &str, format: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), format).map_err(|e| RankingError::Date {
        value: value.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_names_round_trip() {
        assert_eq!(month_number("MARCH"), Some(3));
        assert_eq!(month_number("december"), Some(12));
        assert_eq!(month_number("Smarch"), None);

        let ym = YearMonth::from_name(2013, "MARCH").unwrap();
        assert_eq!(ym.month_name(), "MARCH");
        assert_eq!(ym.to_string(), "2013-03");
    }

    #[test]
    fn stepping_crosses_year_forward_but_not_backward() {
        let dec = YearMonth::new(2012, 12).unwrap();
        assert_eq!(dec.next(), YearMonth::new(2013, 1).unwrap());

        let jan = YearMonth::new(2013, 1).unwrap();
        assert_eq!(jan.prev_in_year(), None);
        assert_eq!(dec.prev_in_year(), Some(YearMonth::new(2012, 11).unwrap()));
    }

    #[test]
    fn through_is_inclusive() {
        let from: YearMonth = "2012-11".parse().unwrap();
        let to: YearMonth = "2013-02".parse().unwrap();
        let months: Vec<String> = from.through(to).map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2012-11", "2012-12", "2013-01", "2013-02"]);

        assert_eq!(to.through(from).count(), 0);
    }

    #[test]
    fn rejects_bad_months() {
        assert!(YearMonth::new(2013, 13).is_err());
        assert!("2013".parse::<YearMonth>().is_err());
        assert!("2013-00".parse::<YearMonth>().is_err());
    }

    #[test]
    fn parses_dates_with_format() {
        let d = parse_date("01/06/2011", "%d/%m/%Y").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2011, 6, 1).unwrap());
        assert!(parse_date("2011/06/01", "%d/%m/%Y").is_err());
        assert!(YearMonth::of(d).contains(NaiveDate::from_ymd_opt(2011, 6, 30).unwrap()));
    }
}
