use std::fmt;

use chrono::{Datelike, NaiveDate};
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::dividends::LedgerRecord;

/// Calendar month used as the grouping key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Subtotal of one settlement month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    pub month: YearMonth,
    pub payments: usize,
    pub gross_source: Decimal,
    pub net_source: Decimal,
    pub gross_destination: Decimal,
    pub net_destination: Decimal,
    /// This month's net source amount minus the previous month's; zero for
    /// the first month present
    pub net_change: Decimal,
}

impl MonthlySummary {
    /// Marker shown in the first column of summary rows
    pub fn label(&self) -> String {
        format!("[{}] Total", self.month)
    }
}

/// A line of the monthly report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReportRow {
    Detail(LedgerRecord),
    Summary(MonthlySummary),
}

impl ReportRow {
    pub fn is_summary(&self) -> bool {
        matches!(self, ReportRow::Summary(_))
    }
}

/// Group the ledger by destination payment month.
///
/// Records are stably sorted by destination payment date; each month emits
/// its detail rows followed by one summary row.
pub fn monthly_report(records: &[LedgerRecord]) -> Vec<ReportRow> {
    let mut sorted: Vec<&LedgerRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.destination_payment_date);

    let mut rows = Vec::with_capacity(sorted.len() + 12);
    let mut previous_net: Option<Decimal> = None;

    let months = sorted
        .into_iter()
        .chunk_by(|r| YearMonth::of(r.destination_payment_date));

    for (month, group) in &months {
        let details: Vec<LedgerRecord> = group.cloned().collect();
        let totals = ReportTotals::from_records(&details);

        let net_change = previous_net
            .map(|prev| totals.net_source - prev)
            .unwrap_or(Decimal::ZERO);
        previous_net = Some(totals.net_source);

        rows.extend(details.into_iter().map(ReportRow::Detail));
        rows.push(ReportRow::Summary(MonthlySummary {
            month,
            payments: totals.payments,
            gross_source: totals.gross_source,
            net_source: totals.net_source,
            gross_destination: totals.gross_destination,
            net_destination: totals.net_destination,
            net_change,
        }));
    }

    rows
}

/// Grand totals across all payments of a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportTotals {
    pub payments: usize,
    pub gross_source: Decimal,
    pub net_source: Decimal,
    pub gross_destination: Decimal,
    pub net_destination: Decimal,
}

impl ReportTotals {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a LedgerRecord>) -> Self {
        records
            .into_iter()
            .fold(ReportTotals::default(), |mut acc, r| {
                acc.payments += 1;
                acc.gross_source += r.gross_source;
                acc.net_source += r.net_source;
                acc.gross_destination += r.gross_destination;
                acc.net_destination += r.net_destination;
                acc
            })
    }
}
