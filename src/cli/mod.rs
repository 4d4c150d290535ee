use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};

pub mod export;
pub mod formatters;

#[derive(Parser, Debug)]
#[command(name = "payday")]
#[command(
    version,
    about = "Dividend income projector for US equities paid out in KRW"
)]
#[command(
    long_about = "Project the dividends a portfolio of US-listed lots pays in a year, with settlement dates across the US and Korean calendars, historical USD/KRW conversion, 15% withholding and monthly subtotals."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Configuration file (default: $PAYDAY_CONFIG or the user config directory)
    #[arg(long = "config", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Monthly dividend report for a year
    Report {
        /// Year in which the payments reach the destination account
        year: i32,

        /// Only include these tickers (repeatable; default: all)
        #[arg(short, long = "ticker", value_name = "TICKER")]
        tickers: Vec<String>,

        /// Also write the report to a CSV file
        #[arg(short, long, value_name = "FILE")]
        export: Option<PathBuf>,

        /// Show full account numbers instead of masking them
        #[arg(long)]
        show_accounts: bool,
    },

    /// Portfolio lots
    Portfolio {
        #[command(subcommand)]
        action: PortfolioCommands,
    },

    /// Exchange rate a payment on DATE would be converted at
    Fx {
        /// Payment date (YYYY-MM-DD)
        date: NaiveDate,
    },

    /// Local and destination payment dates for an ex-dividend date
    Calendar {
        /// Ex-dividend date (YYYY-MM-DD)
        ex_date: NaiveDate,
    },
}

#[derive(Subcommand, Debug)]
pub enum PortfolioCommands {
    /// List all lots
    Show {
        /// Show full account numbers instead of masking them
        #[arg(long)]
        show_accounts: bool,
    },

    /// Record a purchase in the portfolio file (CSV portfolios only)
    Add {
        ticker: String,
        quantity: u32,
        /// Purchase date (YYYY-MM-DD)
        date: NaiveDate,
        account: String,
    },
}
