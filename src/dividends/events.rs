//! Per-ticker dividend events and the price history used for yields

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::pricing::{DividendEvent, MarketData, PriceObservation};

/// Dividend events of one ticker around a target year, with the closes
/// needed to price them
#[derive(Debug, Clone)]
pub struct TickerEvents {
    pub ticker: String,
    /// Events with `year - 1 <= ex_date.year <= year`, oldest first
    pub events: Vec<DividendEvent>,
    pub prices: Vec<PriceObservation>,
}

impl TickerEvents {
    pub fn prior_close(&self, ex_date: NaiveDate) -> Decimal {
        prior_close(&self.prices, ex_date)
    }
}

/// Half-open price window `[year-1-01-01, year+1-02-01)` fetched per ticker
pub fn price_window(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        NaiveDate::from_ymd_opt(year - 1, 1, 1)?,
        NaiveDate::from_ymd_opt(year + 1, 2, 1)?,
    ))
}

/// Fetch and filter the dividend events of `ticker` for `year`.
///
/// `None` when either history fetch fails or the ticker never paid a
/// dividend; the ticker then contributes nothing. An empty price series is
/// not a failure and leaves every prior close at zero.
pub async fn extract_events<M: MarketData>(
    provider: &M,
    ticker: &str,
    year: i32,
) -> Option<TickerEvents> {
    let history = match provider.dividend_history(ticker).await {
        Ok(history) => history,
        Err(e) => {
            warn!("Skipping {}: dividend history unavailable ({})", ticker, e);
            return None;
        }
    };
    if history.is_empty() {
        info!("{} has no dividend history, skipping", ticker);
        return None;
    }

    let mut events: Vec<DividendEvent> = history
        .into_iter()
        .filter(|e| (year - 1..=year).contains(&e.ex_date.year()))
        .collect();
    events.sort_by_key(|e| e.ex_date);
    debug!("{} has {} events in {}..={}", ticker, events.len(), year - 1, year);

    let prices = match price_window(year) {
        Some((from, to)) if !events.is_empty() => {
            match provider.price_history(ticker, from, to).await {
                Ok(prices) => prices,
                Err(e) => {
                    warn!("Skipping {}: price history unavailable ({})", ticker, e);
                    return None;
                }
            }
        }
        _ => Vec::new(),
    };

    Some(TickerEvents {
        ticker: ticker.to_string(),
        events,
        prices,
    })
}

/// Close of the latest observation strictly before `ex_date`, or zero
pub fn prior_close(prices: &[PriceObservation], ex_date: NaiveDate) -> Decimal {
    prices
        .iter()
        .filter(|p| p.date < ex_date)
        .max_by_key(|p| p.date)
        .map(|p| p.close)
        .unwrap_or(Decimal::ZERO)
}
