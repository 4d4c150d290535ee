// Pricing module - market data and FX providers
//
// Provider calls return explicit results; the fallback policy for missing
// data lives with the caller (see `fx::FxRateLookup` and `dividends::events`).

pub mod fx;
pub mod yahoo;

pub use fx::{FxQuote, FxRateLookup, RateSource, FALLBACK_RATE, FX_WINDOW_DAYS};
pub use yahoo::YahooClient;

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures at the provider boundary
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("provider returned error status: {0}")]
    Status(u16),

    #[error("provider API error: {code} - {description}")]
    Api { code: String, description: String },

    #[error("unexpected provider response: {0}")]
    Parse(String),

    #[error("offline mode: network access is disabled")]
    Offline,
}

/// One ex-dividend event as reported by the market data provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DividendEvent {
    pub ticker: String,
    pub ex_date: NaiveDate,
    /// Dividend per share in the source currency
    pub amount: Decimal,
}

/// Daily closing value (share price or exchange rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceObservation {
    pub date: NaiveDate,
    pub close: Decimal,
}

/// Source and destination currency of the conversion
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: String,
    pub quote: String,
}

impl CurrencyPair {
    pub fn new(base: &str, quote: &str) -> Self {
        Self {
            base: base.trim().to_uppercase(),
            quote: quote.trim().to_uppercase(),
        }
    }

    /// Symbol of the pair on Yahoo Finance (e.g. `USDKRW=X`)
    pub fn yahoo_symbol(&self) -> String {
        format!("{}{}=X", self.base, self.quote)
    }
}

impl Default for CurrencyPair {
    fn default() -> Self {
        Self::new("USD", "KRW")
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Per-ticker dividend and price history
#[allow(async_fn_in_trait)]
pub trait MarketData {
    /// Complete ex-dividend history of `ticker`, unbounded in time.
    ///
    /// A ticker that never paid a dividend yields an empty vec, not an error.
    async fn dividend_history(&self, ticker: &str) -> Result<Vec<DividendEvent>, ProviderError>;

    /// Daily closes for `ticker` over the half-open range `[from, to)`
    async fn price_history(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceObservation>, ProviderError>;
}

/// Daily closing exchange rates
#[allow(async_fn_in_trait)]
pub trait FxSource {
    /// Closing rates of `pair` over the half-open range `[from, to)`
    async fn closing_rates(
        &self,
        pair: &CurrencyPair,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceObservation>, ProviderError>;
}

impl<T: MarketData> MarketData for &T {
    async fn dividend_history(&self, ticker: &str) -> Result<Vec<DividendEvent>, ProviderError> {
        (**self).dividend_history(ticker).await
    }

    async fn price_history(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceObservation>, ProviderError> {
        (**self).price_history(ticker, from, to).await
    }
}

impl<T: FxSource> FxSource for &T {
    async fn closing_rates(
        &self,
        pair: &CurrencyPair,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceObservation>, ProviderError> {
        (**self).closing_rates(pair, from, to).await
    }
}
