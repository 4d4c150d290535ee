use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;
use tracing::info;

use super::formatters::{report_cells, report_headers};
use crate::pricing::CurrencyPair;
use crate::reports::ReportRow;

/// Write the report table, summary rows included, to a CSV file
pub fn write_report_csv(
    path: &Path,
    rows: &[ReportRow],
    pair: &CurrencyPair,
    show_accounts: bool,
) -> Result<()> {
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("Failed to create export file {:?}", path))?;

    writer.write_record(report_headers(pair))?;
    for row in rows {
        writer.write_record(report_cells(row, pair, show_accounts))?;
    }
    writer.flush()?;

    info!("Exported {} rows to {:?}", rows.len(), path);
    Ok(())
}
