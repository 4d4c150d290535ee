//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation.

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::dividends::{SettlementDates, YearLedger};
use crate::portfolio::Lot;
use crate::pricing::{CurrencyPair, FxQuote, RateSource};
use crate::reports::{ReportRow, ReportTotals};
use crate::utils::{format_krw, format_number, format_percent, format_usd, mask_account};

/// Account as shown to the user; masked unless explicitly requested
pub fn display_account(account: &str, show_accounts: bool) -> String {
    if show_accounts {
        account.to_string()
    } else {
        mask_account(account)
    }
}

/// Amount in the given currency, with its symbol when one is known
pub fn format_money(currency: &str, value: Decimal) -> String {
    match currency {
        "USD" => format_usd(value),
        "KRW" => format_krw(value),
        _ => format!("{} {}", format_number(value), currency),
    }
}

fn format_change(value: Decimal, currency: &str) -> String {
    let text = format_money(currency, value);
    if value > Decimal::ZERO {
        format!("+{}", text).green().to_string()
    } else if value < Decimal::ZERO {
        text.red().to_string()
    } else {
        text
    }
}

/// Column headers of the report table and CSV export
pub fn report_headers(pair: &CurrencyPair) -> Vec<String> {
    vec![
        "Ex-Date".to_string(),
        "Paid (Local)".to_string(),
        "Paid (Dest.)".to_string(),
        "Ticker".to_string(),
        "Qty".to_string(),
        "Prior Close".to_string(),
        "Yield".to_string(),
        "DPS".to_string(),
        format!("Gross {}", pair.base),
        format!("Net {}", pair.base),
        format!("Gross {}", pair.quote),
        format!("Net {}", pair.quote),
        "FX / Net Change".to_string(),
        "Account".to_string(),
    ]
}

/// Cells of one report row, in [`report_headers`] order.
///
/// Summary rows put their label in the first column and the month-over-month
/// net change in the FX column.
pub fn report_cells(row: &ReportRow, pair: &CurrencyPair, show_accounts: bool) -> Vec<String> {
    match row {
        ReportRow::Detail(r) => {
            let fx = match r.fx_source {
                RateSource::Market => format_number(r.fx_rate),
                RateSource::Fallback => format!("{}*", format_number(r.fx_rate)),
            };
            vec![
                r.ex_date.to_string(),
                r.local_payment_date.to_string(),
                r.destination_payment_date.to_string(),
                r.ticker.clone(),
                r.quantity.to_string(),
                format_money(&pair.base, r.prior_close),
                format_percent(r.yield_percent),
                r.dividend_per_share.normalize().to_string(),
                format_money(&pair.base, r.gross_source),
                format_money(&pair.base, r.net_source),
                format_money(&pair.quote, r.gross_destination),
                format_money(&pair.quote, r.net_destination),
                fx,
                display_account(&r.account, show_accounts),
            ]
        }
        ReportRow::Summary(s) => vec![
            s.label(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            format_money(&pair.base, s.gross_source),
            format_money(&pair.base, s.net_source),
            format_money(&pair.quote, s.gross_destination),
            format_money(&pair.quote, s.net_destination),
            format_money(&pair.base, s.net_change),
            String::new(),
        ],
    }
}

/// Format the monthly report as a table with a totals footer
pub fn format_report(
    ledger: &YearLedger,
    rows: &[ReportRow],
    pair: &CurrencyPair,
    show_accounts: bool,
) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{} Dividend payments in {}\n\n",
        "💰".cyan().bold(),
        ledger.year
    ));

    let mut builder = Builder::default();
    builder.push_record(report_headers(pair));
    for row in rows {
        let mut cells = report_cells(row, pair, show_accounts);
        if let ReportRow::Summary(s) = row {
            cells[12] = format_change(s.net_change, &pair.base);
            for cell in cells.iter_mut().take(12) {
                *cell = cell.bold().to_string();
            }
        }
        builder.push_record(cells);
    }

    let mut table = builder.build();
    table.with(Style::modern());
    // Right-align the numeric columns
    table.modify(Columns::new(4..13), Alignment::right());
    output.push_str(&table.to_string());

    let totals = ReportTotals::from_records(&ledger.records);
    output.push_str(&format_totals(&totals, pair));

    if ledger.records.iter().any(|r| r.fx_source == RateSource::Fallback) {
        output.push_str(&format!(
            "{}\n",
            "* no market rate available, fallback rate used".bright_black()
        ));
    }

    output
}

fn format_totals(totals: &ReportTotals, pair: &CurrencyPair) -> String {
    let mut output = format!("\n\n{} Summary", "━".repeat(80).bright_black());
    output.push_str(&format!("\n{:<20} {}", "Payments:".bold(), totals.payments));
    output.push_str(&format!(
        "\n{:<20} {}",
        format!("Gross {}:", pair.base).bold(),
        format_money(&pair.base, totals.gross_source)
    ));
    output.push_str(&format!(
        "\n{:<20} {}",
        format!("Net {}:", pair.base).bold(),
        format_money(&pair.base, totals.net_source)
    ));
    output.push_str(&format!(
        "\n{:<20} {}",
        format!("Gross {}:", pair.quote).bold(),
        format_money(&pair.quote, totals.gross_destination)
    ));
    output.push_str(&format!(
        "\n{:<20} {}\n",
        format!("Net {}:", pair.quote).bold(),
        format_money(&pair.quote, totals.net_destination)
    ));
    output
}

/// Format the monthly report for JSON output
/// Outcome of a report run, reported in JSON output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Ok,
    /// The portfolio has no lots
    NoData,
    /// Lots exist but no payment settles in the year
    NoPayments,
}

impl ReportStatus {
    pub fn of(ledger: &YearLedger) -> Self {
        if ledger.is_empty() {
            ReportStatus::NoPayments
        } else {
            ReportStatus::Ok
        }
    }
}

pub fn format_report_json(
    ledger: &YearLedger,
    rows: &[ReportRow],
    pair: &CurrencyPair,
    status: ReportStatus,
    show_accounts: bool,
) -> Result<String> {
    #[derive(Serialize)]
    struct JsonReport<'a> {
        year: i32,
        status: ReportStatus,
        pair: &'a CurrencyPair,
        rows: Vec<ReportRow>,
        totals: ReportTotals,
    }

    let rows = rows
        .iter()
        .cloned()
        .map(|row| match row {
            ReportRow::Detail(mut r) => {
                r.account = display_account(&r.account, show_accounts);
                ReportRow::Detail(r)
            }
            summary => summary,
        })
        .collect();

    let report = JsonReport {
        year: ledger.year,
        status,
        pair,
        rows,
        totals: ReportTotals::from_records(&ledger.records),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Format empty portfolio message
pub fn format_empty_portfolio() -> String {
    format!(
        "{} No data: the portfolio has no lots\nAdd one using: {} portfolio add <TICKER> <QTY> <DATE> <ACCOUNT>\n",
        "ℹ".blue().bold(),
        "payday".bold()
    )
}

pub fn format_no_payments(year: i32) -> String {
    format!(
        "{} No data: no dividend payments settle in {}\n",
        "ℹ".blue().bold(),
        year
    )
}

/// Format the portfolio lots as a table
pub fn format_portfolio(lots: &[Lot], show_accounts: bool) -> String {
    #[derive(Tabled)]
    struct LotRow {
        #[tabled(rename = "Ticker")]
        ticker: String,
        #[tabled(rename = "Purchased")]
        purchase_date: String,
        #[tabled(rename = "Quantity")]
        quantity: u32,
        #[tabled(rename = "Account")]
        account: String,
    }

    let rows: Vec<LotRow> = lots
        .iter()
        .map(|lot| LotRow {
            ticker: lot.ticker.clone(),
            purchase_date: lot.purchase_date.to_string(),
            quantity: lot.quantity,
            account: display_account(&lot.account, show_accounts),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(2..3), Alignment::right());

    format!(
        "\n{} Portfolio ({} lots)\n\n{}\n",
        "📊".cyan().bold(),
        lots.len(),
        table
    )
}

pub fn format_portfolio_json(lots: &[Lot], show_accounts: bool) -> Result<String> {
    let lots: Vec<Lot> = lots
        .iter()
        .cloned()
        .map(|mut lot| {
            lot.account = display_account(&lot.account, show_accounts);
            lot
        })
        .collect();
    Ok(serde_json::to_string_pretty(&lots)?)
}

pub fn format_fx(date: NaiveDate, pair: &CurrencyPair, quote: &FxQuote) -> String {
    let source = match quote.source {
        RateSource::Market => "market close".green(),
        RateSource::Fallback => "fallback".yellow(),
    };
    format!(
        "{} on {}: {} ({})\n",
        pair.to_string().bold(),
        date,
        format_number(quote.rate),
        source
    )
}

pub fn format_settlement(dates: &SettlementDates, local: &str, destination: &str) -> String {
    format!(
        "{:<14} {}\n{:<14} {}\n{:<14} {}\n",
        "Ex-date:".bold(),
        dates.ex_date,
        format!("Paid ({}):", local).bold(),
        dates.local_payment,
        format!("Paid ({}):", destination).bold(),
        dates.destination_payment,
    )
}
