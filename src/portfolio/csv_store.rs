use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use csv::{ReaderBuilder, WriterBuilder};
use tracing::{debug, info, warn};

use super::{sort_lots, ColumnMapping, Lot, PortfolioStore};
use crate::error::PaydayError;

const HEADER: [&str; 4] = ["ticker", "purchase_date", "quantity", "account"];

/// Portfolio kept as a comma-separated file with a header row
#[derive(Debug, Clone)]
pub struct CsvPortfolio {
    path: PathBuf,
}

impl CsvPortfolio {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn failure(&self, reason: impl ToString) -> PaydayError {
        PaydayError::Portfolio {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }

    /// Replace the file contents with `lots`, creating parent directories
    pub fn save(&self, lots: &[Lot]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.failure(e))?;
            }
        }

        let mut writer = WriterBuilder::new()
            .from_path(&self.path)
            .map_err(|e| self.failure(e))?;
        writer.write_record(HEADER).map_err(|e| self.failure(e))?;

        for lot in lots {
            let date = lot.purchase_date.format("%Y-%m-%d").to_string();
            let quantity = lot.quantity.to_string();
            writer
                .write_record([
                    lot.ticker.as_str(),
                    date.as_str(),
                    quantity.as_str(),
                    lot.account.as_str(),
                ])
                .map_err(|e| self.failure(e))?;
        }
        writer.flush().map_err(|e| self.failure(e))?;

        debug!("Wrote {} lots to {:?}", lots.len(), self.path);
        Ok(())
    }

    /// Add one lot, keeping the file sorted
    pub fn append(&self, lot: Lot) -> Result<()> {
        let mut lots = self.load()?;
        info!(
            "Adding {} x{} ({}) to account {}",
            lot.ticker, lot.quantity, lot.purchase_date, lot.account
        );
        lots.push(lot);
        sort_lots(&mut lots);
        self.save(&lots)
    }
}

impl PortfolioStore for CsvPortfolio {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<Lot>> {
        if !self.path.exists() {
            info!("Portfolio file {:?} does not exist yet", self.path);
            return Ok(Vec::new());
        }
        info!("Loading portfolio from {:?}", self.path);

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| self.failure(e))?;

        let headers = reader.headers().map_err(|e| self.failure(e))?.clone();
        // An empty file has no header row at all
        if headers.is_empty() {
            return Ok(Vec::new());
        }
        let mapping =
            ColumnMapping::from_headers(headers.iter()).map_err(|e| self.failure(e))?;
        debug!("Column mapping: {:?}", mapping);

        let mut lots = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result.map_err(|e| self.failure(e))?;
            let fields: Vec<String> = record.iter().map(str::to_string).collect();

            match mapping.parse_row(&fields) {
                Ok(Some(lot)) => lots.push(lot),
                Ok(None) => continue,
                Err(e) => {
                    warn!("Skipping row {}: {}", idx + 2, e);
                    continue;
                }
            }
        }

        sort_lots(&mut lots);
        info!("Loaded {} lots", lots.len());
        Ok(lots)
    }
}
