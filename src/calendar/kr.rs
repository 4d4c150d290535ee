use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{Datelike, NaiveDate, Weekday};

use tracing::debug;

use super::{is_weekend, HolidayCalendar};

/// Solar dates of the lunar holidays: (year, Seollal, Buddha's Birthday, Chuseok).
///
/// Seollal and Chuseok are the middle day of their three-day blocks.
const LUNAR_HOLIDAYS: &[(i32, (u32, u32), (u32, u32), (u32, u32))] = &[
    (2015, (2, 19), (5, 25), (9, 27)),
    (2016, (2, 8), (5, 14), (9, 15)),
    (2017, (1, 28), (5, 3), (10, 4)),
    (2018, (2, 16), (5, 22), (9, 24)),
    (2019, (2, 5), (5, 12), (9, 13)),
    (2020, (1, 25), (4, 30), (10, 1)),
    (2021, (2, 12), (5, 19), (9, 21)),
    (2022, (2, 1), (5, 8), (9, 10)),
    (2023, (1, 22), (5, 27), (9, 29)),
    (2024, (2, 10), (5, 15), (9, 17)),
    (2025, (1, 29), (5, 5), (10, 6)),
    (2026, (2, 17), (5, 24), (9, 25)),
    (2027, (2, 7), (5, 13), (9, 15)),
    (2028, (1, 27), (5, 2), (10, 3)),
    (2029, (2, 13), (5, 20), (9, 22)),
    (2030, (2, 3), (5, 9), (9, 12)),
];

/// Korean public holidays, including substitute holidays
#[derive(Debug, Clone, Copy, Default)]
pub struct KrHolidays;

/// When a holiday earns a substitute day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Substitute {
    Never,
    /// falls on Saturday or Sunday, or shares a date with another holiday
    Weekend,
    /// a day of the block falls on Sunday, or shares a date with another holiday
    Sunday,
}

#[derive(Debug)]
struct Observance {
    days: Vec<NaiveDate>,
    substitute: Substitute,
}

impl KrHolidays {
    /// All holidays falling inside `year`.
    ///
    /// Lunar holidays are only known for the years in the built-in table;
    /// outside of it only the solar holidays apply.
    pub fn holidays_in(year: i32) -> BTreeSet<NaiveDate> {
        let observances = observances_for(year);

        let mut seen: HashMap<NaiveDate, usize> = HashMap::new();
        for day in observances.iter().flat_map(|o| o.days.iter()) {
            *seen.entry(*day).or_default() += 1;
        }

        let mut holidays: BTreeSet<NaiveDate> = seen.keys().copied().collect();
        // two holidays sharing a date earn a single substitute between them
        let mut compensated: HashSet<NaiveDate> = HashSet::new();

        for observance in &observances {
            let overlaps = observance.days.iter().any(|day| seen[day] > 1);
            let triggered = match observance.substitute {
                Substitute::Never => false,
                Substitute::Weekend => overlaps || observance.days.iter().any(|d| is_weekend(*d)),
                Substitute::Sunday => {
                    overlaps
                        || observance
                            .days
                            .iter()
                            .any(|d| d.weekday() == Weekday::Sun)
                }
            };
            if !triggered || observance.days.iter().any(|d| compensated.contains(d)) {
                continue;
            }
            compensated.extend(observance.days.iter().copied());

            let Some(mut candidate) = observance.days.last().copied() else {
                continue;
            };
            while let Some(next) = candidate.succ_opt() {
                candidate = next;
                if !is_weekend(candidate) && !holidays.contains(&candidate) {
                    holidays.insert(candidate);
                    break;
                }
            }
        }

        holidays
    }
}

impl HolidayCalendar for KrHolidays {
    fn name(&self) -> &str {
        "KR"
    }

    fn is_holiday(&self, date: NaiveDate) -> bool {
        Self::holidays_in(date.year()).contains(&date)
    }

    fn covers(&self, year: i32) -> bool {
        lunar_dates(year).is_some()
    }
}

fn lunar_dates(year: i32) -> Option<((u32, u32), (u32, u32), (u32, u32))> {
    LUNAR_HOLIDAYS
        .iter()
        .find(|(y, ..)| *y == year)
        .map(|&(_, seollal, buddha, chuseok)| (seollal, buddha, chuseok))
}

fn observances_for(year: i32) -> Vec<Observance> {
    let date = |(month, day): (u32, u32)| NaiveDate::from_ymd_opt(year, month, day);
    let since = |first_year: i32| {
        if year >= first_year {
            Substitute::Weekend
        } else {
            Substitute::Never
        }
    };

    let mut fixed = vec![
        (date((1, 1)), Substitute::Never),
        (date((3, 1)), since(2021)),
        (date((5, 5)), since(2014)), // Children's Day
        (date((6, 6)), Substitute::Never),
        (date((8, 15)), since(2021)),
        (date((10, 3)), since(2021)),
        (date((12, 25)), since(2023)),
    ];
    if year >= 2013 {
        fixed.push((date((10, 9)), since(2021))); // Hangul Day
    }

    let mut observances: Vec<Observance> = fixed
        .into_iter()
        .filter_map(|(day, substitute)| {
            day.map(|day| Observance {
                days: vec![day],
                substitute,
            })
        })
        .collect();

    let lunar = lunar_dates(year);
    if lunar.is_none() {
        debug!("No lunar holiday dates for {}, using solar holidays only", year);
    }
    if let Some((seollal, buddha, chuseok)) = lunar {
        let block_rule = if year >= 2014 {
            Substitute::Sunday
        } else {
            Substitute::Never
        };
        for middle in [date(seollal), date(chuseok)].into_iter().flatten() {
            let days: Vec<NaiveDate> = [middle.pred_opt(), Some(middle), middle.succ_opt()]
                .into_iter()
                .flatten()
                .collect();
            observances.push(Observance {
                days,
                substitute: block_rule,
            });
        }
        if let Some(day) = date(buddha) {
            observances.push(Observance {
                days: vec![day],
                substitute: since(2023),
            });
        }
    }

    observances.sort_by_key(|o| o.days.first().copied());
    observances
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_fixed_holidays() {
        assert!(KrHolidays.is_holiday(d(2024, 1, 1)));
        assert!(KrHolidays.is_holiday(d(2024, 3, 1)));
        assert!(KrHolidays.is_holiday(d(2024, 6, 6)));
        assert!(KrHolidays.is_holiday(d(2024, 8, 15)));
        assert!(KrHolidays.is_holiday(d(2024, 12, 25)));
        assert!(!KrHolidays.is_holiday(d(2024, 12, 26)));
    }

    #[test]
    fn test_chuseok_block() {
        assert!(KrHolidays.is_holiday(d(2024, 9, 16)));
        assert!(KrHolidays.is_holiday(d(2024, 9, 17)));
        assert!(KrHolidays.is_holiday(d(2024, 9, 18)));
        assert!(!KrHolidays.is_holiday(d(2024, 9, 19)));
    }

    #[test]
    fn test_seollal_on_sunday_gets_substitute() {
        // 9-11 February 2024 ends on a Sunday
        assert!(KrHolidays.is_holiday(d(2024, 2, 12)));
    }

    #[test]
    fn test_childrens_day_on_sunday_gets_substitute() {
        assert!(KrHolidays.is_holiday(d(2024, 5, 6)));
    }

    #[test]
    fn test_overlapping_holidays_get_substitute() {
        // Children's Day and Buddha's Birthday coincide on 5 May 2025
        assert!(KrHolidays.is_holiday(d(2025, 5, 6)));
    }

    #[test]
    fn test_hangul_day_substitute_from_2021() {
        // 9 October 2022 was a Sunday
        assert!(KrHolidays.is_holiday(d(2022, 10, 10)));
    }

    #[test]
    fn test_no_substitute_before_rule_applies() {
        // 1 March 2020 was a Sunday, substitutes for it began in 2021
        assert!(!KrHolidays.is_holiday(d(2020, 3, 2)));
    }

    #[test]
    fn test_years_outside_lunar_table_keep_solar_holidays() {
        let holidays = KrHolidays::holidays_in(2040);
        assert!(holidays.contains(&d(2040, 1, 1)));
        assert!(holidays.contains(&d(2040, 8, 15)));
        assert!(!KrHolidays.covers(2040));
        assert!(KrHolidays.covers(2024));
    }
}
