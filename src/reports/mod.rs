// Reports module - monthly dividend income report

pub mod monthly;

pub use monthly::{monthly_report, MonthlySummary, ReportRow, ReportTotals, YearMonth};
