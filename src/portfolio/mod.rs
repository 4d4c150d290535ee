//! Portfolio lots and the spreadsheet stores they are kept in
//!
//! The computation only ever reads a snapshot of lots; writing is limited to
//! the CSV store backing the `portfolio add` command.

mod csv_store;
mod excel;

pub use csv_store::CsvPortfolio;
pub use excel::ExcelPortfolio;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PaydayError;

/// A discrete purchase of a security
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    pub ticker: String,
    pub quantity: u32,
    pub purchase_date: NaiveDate,
    pub account: String,
}

impl Lot {
    /// Build a validated lot; the ticker is trimmed and uppercased.
    pub fn new(
        ticker: &str,
        quantity: u32,
        purchase_date: NaiveDate,
        account: &str,
    ) -> Result<Self, PaydayError> {
        let ticker = normalize_ticker(ticker);
        if ticker.is_empty() {
            return Err(PaydayError::InvalidLot("ticker is empty".to_string()));
        }
        if quantity < 1 {
            return Err(PaydayError::InvalidLot(format!(
                "quantity for {} must be at least 1",
                ticker
            )));
        }
        let account = account.trim();
        if account.is_empty() {
            return Err(PaydayError::InvalidLot(format!(
                "account for {} is empty",
                ticker
            )));
        }

        Ok(Self {
            ticker,
            quantity,
            purchase_date,
            account: account.to_string(),
        })
    }

    pub fn matches_ticker(&self, ticker: &str) -> bool {
        self.ticker.eq_ignore_ascii_case(ticker.trim())
    }
}

pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

/// Order lots by ticker, purchase date and account
pub fn sort_lots(lots: &mut [Lot]) {
    lots.sort_by(|a, b| {
        (&a.ticker, a.purchase_date, &a.account).cmp(&(&b.ticker, b.purchase_date, &b.account))
    });
}

/// Read access to wherever the lots are kept
pub trait PortfolioStore {
    fn path(&self) -> &Path;

    /// Snapshot of all valid lots, sorted with [`sort_lots`].
    ///
    /// A missing file is an empty portfolio; an unreadable one is an error.
    fn load(&self) -> Result<Vec<Lot>>;
}

/// Pick the store implementation from the file extension
pub fn open_store(path: impl Into<PathBuf>) -> Box<dyn PortfolioStore> {
    let path = path.into();
    let is_excel = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_lowercase().as_str(), "xlsx" | "xlsm"))
        .unwrap_or(false);

    if is_excel {
        Box::new(ExcelPortfolio::new(path))
    } else {
        Box::new(CsvPortfolio::new(path))
    }
}

/// Column positions of the lot fields in a header row
#[derive(Debug, Clone)]
pub(crate) struct ColumnMapping {
    ticker: usize,
    purchase_date: usize,
    quantity: usize,
    account: usize,
}

impl ColumnMapping {
    /// Scan a header row. English and Korean column names are both
    /// recognised.
    pub(crate) fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut ticker = None;
        let mut purchase_date = None;
        let mut quantity = None;
        let mut account = None;

        for (idx, header) in headers.into_iter().enumerate() {
            let text = header.trim().to_lowercase();

            if text.contains("ticker") || text.contains("symbol") || text.contains("종목") {
                ticker = Some(idx);
            } else if text.contains("date") || text.contains("매수일") {
                purchase_date = Some(idx);
            } else if text.contains("quantity") || text == "qty" || text.contains("수량") {
                quantity = Some(idx);
            } else if text.contains("account") || text.contains("계좌") {
                account = Some(idx);
            }
        }

        Ok(Self {
            ticker: ticker.ok_or_else(|| anyhow!("Ticker column not found"))?,
            purchase_date: purchase_date.ok_or_else(|| anyhow!("Purchase date column not found"))?,
            quantity: quantity.ok_or_else(|| anyhow!("Quantity column not found"))?,
            account: account.ok_or_else(|| anyhow!("Account column not found"))?,
        })
    }

    /// Parse one data row. `Ok(None)` for blank rows.
    pub(crate) fn parse_row(&self, fields: &[String]) -> Result<Option<Lot>> {
        let field = |idx: usize| fields.get(idx).map(|s| s.trim()).unwrap_or("");

        if fields.iter().all(|f| f.trim().is_empty()) {
            return Ok(None);
        }

        let purchase_date = parse_date(field(self.purchase_date))?;
        let quantity = parse_quantity(field(self.quantity))?;
        let lot = Lot::new(
            field(self.ticker),
            quantity,
            purchase_date,
            field(self.account),
        )?;
        Ok(Some(lot))
    }
}

pub(crate) fn parse_date(text: &str) -> Result<NaiveDate> {
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date);
        }
    }
    Err(anyhow!("Could not parse date: {}", text))
}

/// Whole share count; spreadsheets often store `10` as `10.0`
pub(crate) fn parse_quantity(text: &str) -> Result<u32> {
    let value = Decimal::from_str(&text.replace(',', ""))
        .map_err(|_| anyhow!("Could not parse quantity: {}", text))?;
    if !value.fract().is_zero() {
        return Err(anyhow!("Quantity must be a whole number: {}", text));
    }
    value
        .to_u32()
        .ok_or_else(|| anyhow!("Quantity out of range: {}", text))
}
