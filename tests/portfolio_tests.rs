//! Portfolio stores against real CSV and Excel files

use anyhow::Result;
use chrono::NaiveDate;
use payday::portfolio::{open_store, CsvPortfolio, Lot, PortfolioStore};
use payday::PaydayError;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use tempfile::TempDir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Workbook laid out like the dividend sheet: Korean headers, a title row
/// above them, date-formatted purchase dates and numeric account numbers
fn write_korean_workbook(path: &std::path::Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    let notes = workbook.add_worksheet();
    notes.set_name("Notes")?;
    notes.write_string(0, 0, "dividend portfolio")?;

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Portfolio")?;
    worksheet.write_string(0, 0, "보유 종목")?;

    let headers = ["종목코드", "매수일", "수량", "계좌번호"];
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(1, col as u16, *header)?;
    }

    worksheet.write_string(2, 0, "schd")?;
    worksheet.write_datetime_with_format(2, 1, &ExcelDateTime::from_ymd(2023, 5, 10)?, &date_format)?;
    worksheet.write_number(2, 2, 25.0)?;
    worksheet.write_number(2, 3, 5551234567.0)?;

    worksheet.write_string(3, 0, "O")?;
    worksheet.write_string(3, 1, "2024-01-05")?;
    worksheet.write_number(3, 2, 10.0)?;
    worksheet.write_string(3, 3, "110-22-333444")?;

    // invalid quantity, skipped
    worksheet.write_string(4, 0, "VZ")?;
    worksheet.write_string(4, 1, "2024-02-01")?;
    worksheet.write_number(4, 2, 0.0)?;
    worksheet.write_string(4, 3, "110-22-333444")?;

    workbook.save(path)?;
    Ok(())
}

#[test]
fn test_excel_portfolio_with_korean_headers() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("portfolio.xlsx");
    write_korean_workbook(&path)?;

    let lots = open_store(&path).load()?;
    assert_eq!(lots.len(), 2);

    assert_eq!(lots[0].ticker, "O");
    assert_eq!(lots[0].purchase_date, d(2024, 1, 5));
    assert_eq!(lots[0].account, "110-22-333444");

    assert_eq!(lots[1].ticker, "SCHD");
    assert_eq!(lots[1].purchase_date, d(2023, 5, 10));
    assert_eq!(lots[1].quantity, 25);
    assert_eq!(lots[1].account, "5551234567");
    Ok(())
}

#[test]
fn test_excel_without_lot_columns_is_a_portfolio_error() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("other.xlsx");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "Name")?;
    worksheet.write_string(0, 1, "Value")?;
    workbook.save(&path)?;

    let err = open_store(&path).load().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PaydayError>(),
        Some(PaydayError::Portfolio { .. })
    ));
    Ok(())
}

#[test]
fn test_csv_round_trip_through_open_store() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("lots.csv");
    let store = CsvPortfolio::new(&path);

    store.save(&[
        Lot::new("T", 33, d(2022, 7, 1), "B")?,
        Lot::new("O", 10, d(2024, 1, 5), "00123")?,
    ])?;

    let lots = open_store(&path).load()?;
    assert_eq!(lots.len(), 2);
    assert_eq!(lots[0].ticker, "O");
    assert_eq!(lots[0].account, "00123");
    assert_eq!(lots[1].quantity, 33);

    let text = std::fs::read_to_string(&path)?;
    assert!(text.starts_with("ticker,purchase_date,quantity,account"));
    Ok(())
}

#[test]
fn test_csv_with_korean_headers_and_reordered_columns() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("lots.csv");
    std::fs::write(
        &path,
        "계좌번호,수량,매수일,종목코드\n\
         5551234567,7,2023-03-02,jepi\n\
         ,,,\n\
         5551234567,3,2023/04/03,JEPI\n",
    )?;

    let lots = open_store(&path).load()?;
    assert_eq!(lots.len(), 2);
    assert!(lots.iter().all(|l| l.ticker == "JEPI"));
    assert_eq!(lots[1].purchase_date, d(2023, 4, 3));
    Ok(())
}

#[test]
fn test_missing_excel_file_is_empty_portfolio() -> Result<()> {
    let dir = TempDir::new()?;
    let lots = open_store(dir.path().join("absent.xlsx")).load()?;
    assert!(lots.is_empty());
    Ok(())
}
