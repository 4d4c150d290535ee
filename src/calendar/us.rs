use chrono::{Datelike, NaiveDate, Weekday};

use super::HolidayCalendar;

/// US federal holidays with weekend observance shifts
#[derive(Debug, Clone, Copy, Default)]
pub struct UsHolidays;

impl UsHolidays {
    /// All observed holidays falling inside `year`, sorted.
    ///
    /// New Year's Day of the following year is observed on Dec 31 when it
    /// lands on a Saturday, so the next year's rules are scanned as well.
    pub fn holidays_in(year: i32) -> Vec<NaiveDate> {
        let mut days: Vec<NaiveDate> = rules_for(year)
            .into_iter()
            .chain(rules_for(year + 1))
            .filter(|d| d.year() == year)
            .collect();
        days.sort();
        days.dedup();
        days
    }
}

impl HolidayCalendar for UsHolidays {
    fn name(&self) -> &str {
        "US"
    }

    fn is_holiday(&self, date: NaiveDate) -> bool {
        Self::holidays_in(date.year()).contains(&date)
    }
}

fn rules_for(year: i32) -> Vec<NaiveDate> {
    let fixed = |month, day| NaiveDate::from_ymd_opt(year, month, day).map(observed);
    let nth = |month, weekday, n| NaiveDate::from_weekday_of_month_opt(year, month, weekday, n);

    let mut days = vec![
        fixed(1, 1),
        nth(2, Weekday::Mon, 3), // Washington's Birthday
        last_weekday_of_month(year, 5, Weekday::Mon), // Memorial Day
        fixed(7, 4),
        nth(9, Weekday::Mon, 1),  // Labor Day
        nth(10, Weekday::Mon, 2), // Columbus Day
        fixed(11, 11),
        nth(11, Weekday::Thu, 4), // Thanksgiving
        fixed(12, 25),
    ];
    if year >= 1986 {
        days.push(nth(1, Weekday::Mon, 3)); // Martin Luther King Jr. Day
    }
    if year >= 2021 {
        days.push(fixed(6, 19)); // Juneteenth
    }

    days.into_iter().flatten().collect()
}

/// Saturday holidays are observed on Friday, Sunday holidays on Monday
fn observed(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date.pred_opt().unwrap_or(date),
        Weekday::Sun => date.succ_opt().unwrap_or(date),
        _ => date,
    }
}

fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, 5)
        .or_else(|| NaiveDate::from_weekday_of_month_opt(year, month, weekday, 4))
}
