//! Dividend payment projection
//!
//! Turns the per-ticker dividend history and the portfolio lots into a flat
//! ledger of per-account payments for one year:
//!
//! 1. [`events`] fetches each ticker's events around the year
//! 2. [`settlement`] chains the local and destination business-day calendars
//! 3. [`holdings`] sums the entitled shares per account
//! 4. [`ledger`] prices each (event, account) pair in both currencies
//!
//! Failures of a single ticker or rate degrade to an empty contribution or a
//! fallback rate; only an empty portfolio is reported to the caller.

pub mod events;
pub mod holdings;
pub mod ledger;
pub mod settlement;

pub use events::{extract_events, prior_close, TickerEvents};
pub use holdings::{holdings_by_account, AccountHolding};
pub use ledger::{LedgerRecord, TAX_RATE};
pub use settlement::{project, SettlementDates};

use chrono::NaiveDate;
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::calendar::BusinessCalendar;
use crate::error::PaydayError;
use crate::portfolio::{normalize_ticker, Lot};
use crate::pricing::{CurrencyPair, FxRateLookup, FxSource, MarketData};

/// Reported once per processed ticker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub done: usize,
    pub total: usize,
    pub ticker: String,
}

/// Immutable result of one projection run
#[derive(Debug, Clone, Default, Serialize)]
pub struct YearLedger {
    pub year: i32,
    pub records: Vec<LedgerRecord>,
}

impl YearLedger {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Distinct tickers with at least one payment, sorted
    pub fn tickers(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.ticker.clone())
            .sorted()
            .dedup()
            .collect()
    }

    /// Records of the given tickers only (case-insensitive)
    pub fn select<S: AsRef<str>>(&self, tickers: &[S]) -> YearLedger {
        let wanted: Vec<String> = tickers.iter().map(|t| normalize_ticker(t.as_ref())).collect();
        YearLedger {
            year: self.year,
            records: self
                .records
                .iter()
                .filter(|r| wanted.contains(&r.ticker))
                .cloned()
                .collect(),
        }
    }
}

/// Computes a year's dividend ledger from market data, FX rates and the two
/// business-day calendars
#[derive(Debug)]
pub struct DividendProjector<M, F> {
    market: M,
    fx: F,
    pair: CurrencyPair,
    local: BusinessCalendar,
    destination: BusinessCalendar,
}

impl<M: MarketData, F: FxSource> DividendProjector<M, F> {
    pub fn new(
        market: M,
        fx: F,
        pair: CurrencyPair,
        local: BusinessCalendar,
        destination: BusinessCalendar,
    ) -> Self {
        Self {
            market,
            fx,
            pair,
            local,
            destination,
        }
    }

    /// Payment dates of an event with this ex-date
    pub fn settlement(&self, ex_date: NaiveDate) -> SettlementDates {
        project(ex_date, &self.local, &self.destination)
    }

    /// Build the ledger of every payment whose destination payment date
    /// falls in `year`.
    ///
    /// Rates are memoized per payment date within this call only.
    pub async fn project_year(
        &self,
        lots: &[Lot],
        year: i32,
        mut on_progress: impl FnMut(ProgressEvent),
    ) -> Result<YearLedger, PaydayError> {
        if lots.is_empty() {
            return Err(PaydayError::EmptyPortfolio);
        }

        let tickers: Vec<String> = lots
            .iter()
            .map(|lot| normalize_ticker(&lot.ticker))
            .sorted()
            .dedup()
            .collect();
        let total = tickers.len();
        info!("Projecting {} dividends for {} tickers", year, total);

        for calendar in [&self.local, &self.destination] {
            if !(year - 1..=year + 1).all(|y| calendar.covers(y)) {
                warn!(
                    "{} holiday rules incomplete around {}, payment dates may be early",
                    calendar.name(),
                    year
                );
            }
        }

        let mut rates = FxRateLookup::new(&self.fx, self.pair.clone());
        let mut records = Vec::new();

        for (idx, ticker) in tickers.iter().enumerate() {
            if let Some(extracted) = extract_events(&self.market, ticker, year).await {
                for event in &extracted.events {
                    let dates = self.settlement(event.ex_date);
                    if !dates.settles_in(year) {
                        debug!(
                            "{} ex {} pays {}, outside {}",
                            ticker, event.ex_date, dates.destination_payment, year
                        );
                        continue;
                    }

                    let holdings = holdings_by_account(lots, ticker, event.ex_date);
                    if holdings.is_empty() {
                        debug!("No lots of {} held on {}", ticker, event.ex_date);
                        continue;
                    }

                    let close = extracted.prior_close(event.ex_date);
                    for holding in &holdings {
                        let quote = rates.rate_on(dates.destination_payment).await;
                        records.push(LedgerRecord::build(event, &dates, holding, close, quote));
                    }
                }
            }

            on_progress(ProgressEvent {
                done: idx + 1,
                total,
                ticker: ticker.clone(),
            });
        }

        info!("Projected {} payments for {}", records.len(), year);
        Ok(YearLedger { year, records })
    }
}
