use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use super::{CurrencyPair, FxSource, ProviderError};

/// Rate used when the provider has nothing for a date (1350.0 KRW per USD)
pub const FALLBACK_RATE: Decimal = Decimal::from_parts(1350, 0, 0, false, 0);

/// Calendar days searched forward from the requested date, to get past
/// weekends and market holidays
pub const FX_WINDOW_DAYS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Market,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FxQuote {
    pub rate: Decimal,
    pub source: RateSource,
}

impl FxQuote {
    pub fn fallback() -> Self {
        Self {
            rate: FALLBACK_RATE,
            source: RateSource::Fallback,
        }
    }
}

/// Exchange rate lookup with an explicit fallback policy.
///
/// Quotes are memoized per date for the lifetime of the lookup, so accounts
/// sharing a payment date cost a single provider round-trip.
#[derive(Debug)]
pub struct FxRateLookup<F> {
    source: F,
    pair: CurrencyPair,
    memo: HashMap<NaiveDate, FxQuote>,
}

impl<F: FxSource> FxRateLookup<F> {
    pub fn new(source: F, pair: CurrencyPair) -> Self {
        Self {
            source,
            pair,
            memo: HashMap::new(),
        }
    }

    /// Rate for `date`: the first close on or after it within the window,
    /// or [`FALLBACK_RATE`] when the provider fails or has no data. Never errors.
    pub async fn rate_on(&mut self, date: NaiveDate) -> FxQuote {
        if let Some(quote) = self.memo.get(&date) {
            debug!("Using memoized {} rate for {}", self.pair, date);
            return *quote;
        }

        let quote = match self.fetch(date).await {
            Ok(Some(rate)) => FxQuote {
                rate,
                source: RateSource::Market,
            },
            Ok(None) => {
                warn!(
                    "No {} rate within {} days of {}, using fallback {}",
                    self.pair, FX_WINDOW_DAYS, date, FALLBACK_RATE
                );
                FxQuote::fallback()
            }
            Err(e) => {
                warn!(
                    "{} rate lookup for {} failed ({}), using fallback {}",
                    self.pair, date, e, FALLBACK_RATE
                );
                FxQuote::fallback()
            }
        };

        self.memo.insert(date, quote);
        quote
    }

    async fn fetch(&self, date: NaiveDate) -> Result<Option<Decimal>, ProviderError> {
        let to = date
            .checked_add_days(Days::new(FX_WINDOW_DAYS))
            .unwrap_or(date);
        let rates = self.source.closing_rates(&self.pair, date, to).await?;

        Ok(rates
            .into_iter()
            .filter(|obs| obs.date >= date && obs.date < to)
            .min_by_key(|obs| obs.date)
            .map(|obs| obs.close.round_dp(2)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PriceObservation;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedRates {
        rates: Vec<PriceObservation>,
        calls: AtomicUsize,
    }

    impl FxSource for FixedRates {
        async fn closing_rates(
            &self,
            _pair: &CurrencyPair,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<Vec<PriceObservation>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rates.clone())
        }
    }

    struct Failing;

    impl FxSource for Failing {
        async fn closing_rates(
            &self,
            _pair: &CurrencyPair,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<Vec<PriceObservation>, ProviderError> {
            Err(ProviderError::Status(503))
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn test_first_close_in_window_is_used() {
        let source = FixedRates {
            rates: vec![
                PriceObservation {
                    date: d(2024, 3, 5),
                    close: dec!(1331.456),
                },
                PriceObservation {
                    date: d(2024, 3, 4),
                    close: dec!(1329.1234),
                },
            ],
            calls: AtomicUsize::new(0),
        };
        let mut lookup = FxRateLookup::new(source, CurrencyPair::default());

        // Saturday: the first close is Monday's
        let quote = lookup.rate_on(d(2024, 3, 2)).await;
        assert_eq!(quote.rate, dec!(1329.12));
        assert_eq!(quote.source, RateSource::Market);
    }

    #[tokio::test]
    async fn test_empty_series_falls_back() {
        let source = FixedRates {
            rates: vec![],
            calls: AtomicUsize::new(0),
        };
        let mut lookup = FxRateLookup::new(source, CurrencyPair::default());

        let quote = lookup.rate_on(d(2024, 3, 4)).await;
        assert_eq!(quote.rate, dec!(1350.0));
        assert_eq!(quote.source, RateSource::Fallback);
    }

    #[tokio::test]
    async fn test_provider_error_falls_back() {
        let mut lookup = FxRateLookup::new(Failing, CurrencyPair::default());
        assert_eq!(lookup.rate_on(d(2024, 3, 4)).await, FxQuote::fallback());
    }

    #[tokio::test]
    async fn test_rates_are_memoized_per_date() {
        let source = FixedRates {
            rates: vec![PriceObservation {
                date: d(2024, 3, 4),
                close: dec!(1330),
            }],
            calls: AtomicUsize::new(0),
        };
        let mut lookup = FxRateLookup::new(&source, CurrencyPair::default());

        lookup.rate_on(d(2024, 3, 4)).await;
        lookup.rate_on(d(2024, 3, 4)).await;
        lookup.rate_on(d(2024, 3, 3)).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
