use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::calendar::BusinessCalendar;

/// Payment dates derived from one ex-dividend date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettlementDates {
    pub ex_date: NaiveDate,
    /// Next local-market business day after the ex-date
    pub local_payment: NaiveDate,
    /// Next destination-market business day after the local payment
    pub destination_payment: NaiveDate,
}

impl SettlementDates {
    /// Whether the event belongs to `year`'s report. Only the destination
    /// payment date counts; the ex-date's year is irrelevant.
    pub fn settles_in(&self, year: i32) -> bool {
        self.destination_payment.year() == year
    }
}

/// Chain the two calendars: ex-date, then local, then destination
pub fn project(
    ex_date: NaiveDate,
    local: &BusinessCalendar,
    destination: &BusinessCalendar,
) -> SettlementDates {
    let local_payment = local.next_business_day(ex_date);
    let destination_payment = destination.next_business_day(local_payment);
    SettlementDates {
        ex_date,
        local_payment,
        destination_payment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Market;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn calendars() -> (BusinessCalendar, BusinessCalendar) {
        (
            BusinessCalendar::for_market(Market::Us),
            BusinessCalendar::for_market(Market::Kr),
        )
    }

    #[test]
    fn test_plain_weekday_chain() {
        let (us, kr) = calendars();
        let dates = project(d(2024, 3, 1), &us, &kr);
        assert_eq!(dates.local_payment, d(2024, 3, 4));
        assert_eq!(dates.destination_payment, d(2024, 3, 5));
        assert!(dates.settles_in(2024));
    }

    #[test]
    fn test_late_december_rolls_into_next_year() {
        let (us, kr) = calendars();
        let dates = project(d(2024, 12, 30), &us, &kr);
        assert_eq!(dates.local_payment, d(2024, 12, 31));
        assert_eq!(dates.destination_payment, d(2025, 1, 2));
        assert!(!dates.settles_in(2024));
        assert!(dates.settles_in(2025));
    }

    #[test]
    fn test_destination_holidays_push_payment() {
        let (us, kr) = calendars();
        // Chuseok block 16-18 September 2024
        let dates = project(d(2024, 9, 13), &us, &kr);
        assert_eq!(dates.local_payment, d(2024, 9, 16));
        assert_eq!(dates.destination_payment, d(2024, 9, 19));
    }
}
