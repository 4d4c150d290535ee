use std::path::{Path, PathBuf};

use anyhow::Result;
use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{Duration, NaiveDate};
use tracing::{debug, info, warn};

use super::{sort_lots, ColumnMapping, Lot, PortfolioStore};
use crate::error::PaydayError;

/// Read-only portfolio kept in an Excel workbook.
///
/// Every sheet is scanned for a header row naming the four lot columns;
/// the first sheet that has one is used.
#[derive(Debug, Clone)]
pub struct ExcelPortfolio {
    path: PathBuf,
}

impl ExcelPortfolio {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn failure(&self, reason: impl ToString) -> PaydayError {
        PaydayError::Portfolio {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

impl PortfolioStore for ExcelPortfolio {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<Lot>> {
        if !self.path.exists() {
            info!("Portfolio workbook {:?} does not exist yet", self.path);
            return Ok(Vec::new());
        }
        info!("Loading portfolio from workbook {:?}", self.path);

        let mut workbook: Xlsx<_> = open_workbook(&self.path).map_err(|e| self.failure(e))?;

        for sheet_name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(|e| self.failure(e))?;

            let rows: Vec<Vec<String>> = range
                .rows()
                .map(|row| row.iter().map(cell_text).collect())
                .collect();

            let Some((header_idx, mapping)) = rows.iter().enumerate().find_map(|(idx, row)| {
                ColumnMapping::from_headers(row.iter().map(String::as_str))
                    .ok()
                    .map(|mapping| (idx, mapping))
            }) else {
                debug!("Sheet '{}' has no lot header row", sheet_name);
                continue;
            };
            debug!("Using sheet '{}', header row {}", sheet_name, header_idx + 1);

            let mut lots = Vec::new();
            for (idx, row) in rows.iter().enumerate().skip(header_idx + 1) {
                match mapping.parse_row(row) {
                    Ok(Some(lot)) => lots.push(lot),
                    Ok(None) => continue,
                    Err(e) => {
                        warn!("Skipping row {}: {}", idx + 1, e);
                        continue;
                    }
                }
            }

            sort_lots(&mut lots);
            info!("Loaded {} lots", lots.len());
            return Ok(lots);
        }

        Err(self
            .failure("no sheet with ticker, purchase date, quantity and account columns")
            .into())
    }
}

/// Text form of a cell as the row parser expects it
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(dt) => excel_date(dt.as_f64())
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        Data::DateTimeIso(s) => s.split('T').next().unwrap_or_default().to_string(),
        // Account numbers and quantities typed into cells come back as floats
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Empty => String::new(),
        _ => cell.to_string(),
    }
}

fn excel_date(serial: f64) -> Option<NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}
