//! Business-day calendars for the markets a dividend payment passes through.
//!
//! A payment is first settled in the local market (where the security is
//! listed) and then forwarded to the destination market, so the same date is
//! routinely pushed through two calendars in series.

mod kr;
mod us;

pub use kr::KrHolidays;
pub use us::UsHolidays;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Market jurisdictions with a built-in holiday calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    Us,
    Kr,
}

impl Market {
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Us => "US",
            Market::Kr => "KR",
        }
    }

    /// Holiday rules for this market
    pub fn holidays(&self) -> Box<dyn HolidayCalendar> {
        match self {
            Market::Us => Box::new(UsHolidays),
            Market::Kr => Box::new(KrHolidays),
        }
    }
}

impl FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "US" => Ok(Market::Us),
            "KR" => Ok(Market::Kr),
            other => Err(format!("unknown market '{}' (expected US or KR)", other)),
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named set of non-weekend days on which a market is closed
pub trait HolidayCalendar: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn is_holiday(&self, date: NaiveDate) -> bool;

    /// Whether every rule for `year` is known; table-driven calendars can
    /// run out of data
    fn covers(&self, _year: i32) -> bool {
        true
    }
}

/// Weekday-and-holiday aware calendar for one market
#[derive(Debug)]
pub struct BusinessCalendar {
    holidays: Box<dyn HolidayCalendar>,
    extra: BTreeSet<NaiveDate>,
}

impl BusinessCalendar {
    pub fn new(holidays: Box<dyn HolidayCalendar>) -> Self {
        Self {
            holidays,
            extra: BTreeSet::new(),
        }
    }

    pub fn for_market(market: Market) -> Self {
        Self::new(market.holidays())
    }

    /// Add one-off closures (election days, temporary holidays) on top of the rules
    pub fn with_extra_holidays(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.extra.extend(dates);
        self
    }

    pub fn name(&self) -> &str {
        self.holidays.name()
    }

    pub fn covers(&self, year: i32) -> bool {
        self.holidays.covers(year)
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && !self.holidays.is_holiday(date) && !self.extra.contains(&date)
    }

    /// First business day strictly after `date`.
    ///
    /// A business day as input still advances by one; a weekend or holiday
    /// input rolls forward to the next open day.
    pub fn next_business_day(&self, date: NaiveDate) -> NaiveDate {
        let mut candidate = date;
        while let Some(next) = candidate.succ_opt() {
            candidate = next;
            if self.is_business_day(candidate) {
                break;
            }
        }
        candidate
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_friday_rolls_to_monday() {
        let us = BusinessCalendar::for_market(Market::Us);
        assert_eq!(us.next_business_day(d(2024, 3, 1)), d(2024, 3, 4));
    }

    #[test]
    fn test_weekend_rolls_to_monday() {
        let us = BusinessCalendar::for_market(Market::Us);
        assert_eq!(us.next_business_day(d(2024, 3, 2)), d(2024, 3, 4));
        assert_eq!(us.next_business_day(d(2024, 3, 3)), d(2024, 3, 4));
    }

    #[test]
    fn test_business_day_advances_by_one() {
        let us = BusinessCalendar::for_market(Market::Us);
        assert_eq!(us.next_business_day(d(2024, 3, 5)), d(2024, 3, 6));
    }

    #[test]
    fn test_skips_holidays() {
        let us = BusinessCalendar::for_market(Market::Us);
        // Thursday before Independence Day
        assert_eq!(us.next_business_day(d(2024, 7, 3)), d(2024, 7, 5));
    }

    #[test]
    fn test_chained_calendars_across_chuseok() {
        let us = BusinessCalendar::for_market(Market::Us);
        let kr = BusinessCalendar::for_market(Market::Kr);

        let local = us.next_business_day(d(2024, 9, 13));
        assert_eq!(local, d(2024, 9, 16));
        // 16-18 September 2024 is the Chuseok block
        assert_eq!(kr.next_business_day(local), d(2024, 9, 19));
    }

    #[test]
    fn test_chained_calendars_cross_year_boundary() {
        let us = BusinessCalendar::for_market(Market::Us);
        let kr = BusinessCalendar::for_market(Market::Kr);

        let local = us.next_business_day(d(2024, 12, 30));
        assert_eq!(local, d(2024, 12, 31));
        assert_eq!(kr.next_business_day(local), d(2025, 1, 2));
    }

    #[test]
    fn test_extra_holidays_are_skipped() {
        let kr = BusinessCalendar::for_market(Market::Kr).with_extra_holidays([d(2024, 10, 1)]);
        assert_eq!(kr.next_business_day(d(2024, 9, 30)), d(2024, 10, 2));
    }

    #[test]
    fn test_coverage_follows_holiday_rules() {
        let us = BusinessCalendar::for_market(Market::Us);
        let kr = BusinessCalendar::for_market(Market::Kr);
        assert!(us.covers(2040));
        assert!(kr.covers(2030));
        assert!(!kr.covers(2031));
        assert!(!kr.covers(2014));
    }

    #[test]
    fn test_market_parsing() {
        assert_eq!("us".parse::<Market>().unwrap(), Market::Us);
        assert_eq!(" KR ".parse::<Market>().unwrap(), Market::Kr);
        assert!("JP".parse::<Market>().is_err());
    }
}
