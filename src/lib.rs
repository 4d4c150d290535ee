//! Payday - dividend income projector for US equities paid out in KRW
//!
//! This library projects which dividends a portfolio of lots receives in a
//! year, when each payment settles across two market calendars, and what it
//! is worth after withholding in both currencies.

pub mod calendar;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod dividends;
pub mod error;
pub mod portfolio;
pub mod pricing;
pub mod reports;
pub mod ui;
pub mod utils;

pub use error::{PaydayError, Result};
