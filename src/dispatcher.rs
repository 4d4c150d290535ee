//! Command dispatcher that routes parsed clap commands to their handlers.
//!
//! Handlers own all printing; the library modules below them only compute.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use colored::Colorize;
use itertools::Itertools;
use serde::Serialize;
use tracing::info;

use crate::cli::formatters::ReportStatus;
use crate::cli::{export, formatters, Cli, Commands, PortfolioCommands};
use crate::config::Config;
use crate::dividends::{DividendProjector, YearLedger};
use crate::error::PaydayError;
use crate::portfolio::{normalize_ticker, open_store, CsvPortfolio, Lot, PortfolioStore};
use crate::pricing::{FxQuote, FxRateLookup, YahooClient};
use crate::reports::monthly_report;
use crate::ui::ProgressPrinter;

/// Route a parsed command line to its handler
pub async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Report {
            year,
            tickers,
            export,
            show_accounts,
        } => dispatch_report(&config, year, &tickers, export, show_accounts, cli.json).await,
        Commands::Portfolio { action } => match action {
            PortfolioCommands::Show { show_accounts } => {
                dispatch_portfolio_show(&config, show_accounts, cli.json)
            }
            PortfolioCommands::Add {
                ticker,
                quantity,
                date,
                account,
            } => dispatch_portfolio_add(&config, &ticker, quantity, date, &account, cli.json),
        },
        Commands::Fx { date } => dispatch_fx(&config, date, cli.json).await,
        Commands::Calendar { ex_date } => dispatch_calendar(&config, ex_date, cli.json),
    }
}

async fn dispatch_report(
    config: &Config,
    year: i32,
    tickers: &[String],
    export_path: Option<PathBuf>,
    show_accounts: bool,
    json_output: bool,
) -> Result<()> {
    info!("Generating dividend report for {}", year);

    let store = open_store(config.portfolio_path()?);
    let lots = store
        .load()
        .with_context(|| format!("Failed to load portfolio {:?}", store.path()))?;

    let client = YahooClient::new()?;
    let pair = config.currency_pair();
    let projector = DividendProjector::new(
        &client,
        &client,
        pair.clone(),
        config.local_calendar(),
        config.destination_calendar(),
    );

    let total = lots.iter().map(|l| normalize_ticker(&l.ticker)).unique().count();
    let printer = ProgressPrinter::new(total, json_output);
    let result = projector
        .project_year(&lots, year, |event| printer.on_event(&event))
        .await;
    printer.finish();

    let ledger = match result {
        Ok(ledger) => ledger,
        Err(PaydayError::EmptyPortfolio) => {
            if json_output {
                let empty = YearLedger {
                    year,
                    records: Vec::new(),
                };
                println!(
                    "{}",
                    formatters::format_report_json(
                        &empty,
                        &[],
                        &pair,
                        ReportStatus::NoData,
                        show_accounts,
                    )?
                );
            } else {
                print!("{}", formatters::format_empty_portfolio());
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let ledger = if tickers.is_empty() {
        ledger
    } else {
        ledger.select(tickers)
    };
    let rows = monthly_report(&ledger.records);

    if json_output {
        println!(
            "{}",
            formatters::format_report_json(
                &ledger,
                &rows,
                &pair,
                ReportStatus::of(&ledger),
                show_accounts,
            )?
        );
    } else if ledger.is_empty() {
        print!("{}", formatters::format_no_payments(year));
    } else {
        print!(
            "{}",
            formatters::format_report(&ledger, &rows, &pair, show_accounts)
        );
    }

    if let Some(path) = export_path {
        export::write_report_csv(&path, &rows, &pair, show_accounts)?;
        if !json_output {
            println!("{} Exported report to {}", "✓".green().bold(), path.display());
        }
    }

    Ok(())
}

fn dispatch_portfolio_show(config: &Config, show_accounts: bool, json_output: bool) -> Result<()> {
    let store = open_store(config.portfolio_path()?);
    let lots = store
        .load()
        .with_context(|| format!("Failed to load portfolio {:?}", store.path()))?;

    if json_output {
        println!("{}", formatters::format_portfolio_json(&lots, show_accounts)?);
    } else if lots.is_empty() {
        print!("{}", formatters::format_empty_portfolio());
    } else {
        print!("{}", formatters::format_portfolio(&lots, show_accounts));
    }
    Ok(())
}

fn dispatch_portfolio_add(
    config: &Config,
    ticker: &str,
    quantity: u32,
    date: NaiveDate,
    account: &str,
    json_output: bool,
) -> Result<()> {
    let path = config.portfolio_path()?;
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if !is_csv {
        bail!(
            "Adding lots is only supported for CSV portfolios, {:?} is not one",
            path
        );
    }

    let lot = Lot::new(ticker, quantity, date, account)?;
    CsvPortfolio::new(&path).append(lot.clone())?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&lot)?);
    } else {
        println!(
            "{} Added {} x{} bought {} to {}",
            "✓".green().bold(),
            lot.ticker.bold(),
            lot.quantity,
            lot.purchase_date,
            path.display()
        );
    }
    Ok(())
}

async fn dispatch_fx(config: &Config, date: NaiveDate, json_output: bool) -> Result<()> {
    let client = YahooClient::new()?;
    let pair = config.currency_pair();
    let mut lookup = FxRateLookup::new(&client, pair.clone());
    let quote = lookup.rate_on(date).await;

    if json_output {
        #[derive(Serialize)]
        struct JsonRate<'a> {
            date: NaiveDate,
            pair: String,
            #[serde(flatten)]
            quote: &'a FxQuote,
        }
        let out = JsonRate {
            date,
            pair: pair.to_string(),
            quote: &quote,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", formatters::format_fx(date, &pair, &quote));
    }
    Ok(())
}

fn dispatch_calendar(config: &Config, ex_date: NaiveDate, json_output: bool) -> Result<()> {
    let local = config.local_calendar();
    let destination = config.destination_calendar();
    let dates = crate::dividends::project(ex_date, &local, &destination);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&dates)?);
    } else {
        print!(
            "{}",
            formatters::format_settlement(&dates, local.name(), destination.name())
        );
    }
    Ok(())
}
