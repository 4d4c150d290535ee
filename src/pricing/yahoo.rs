use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, NaiveDate};
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};

use super::{CurrencyPair, DividendEvent, FxSource, MarketData, PriceObservation, ProviderError};

const CHART_BASE: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; PaydayBot/1.0)";

/// Set to "1" to make every provider call fail with [`ProviderError::Offline`]
pub const OFFLINE_ENV: &str = "PAYDAY_OFFLINE";

/// Yahoo Finance chart response
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    result: Option<Vec<ChartResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Meta,
    timestamp: Option<Vec<i64>>,
    events: Option<Events>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Meta {
    /// Exchange offset from UTC in seconds
    gmtoffset: Option<i64>,
    #[allow(dead_code)]
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct Events {
    dividends: Option<HashMap<String, DividendPayload>>,
}

#[derive(Debug, Deserialize)]
struct DividendPayload {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

/// Yahoo Finance v8 chart client for dividends, share prices and FX rates
#[derive(Debug, Clone)]
pub struct YahooClient {
    client: Client,
    offline: bool,
}

impl YahooClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        let offline = std::env::var(OFFLINE_ENV)
            .map(|v| v == "1")
            .unwrap_or(false);
        if offline {
            info!("{} set, market data requests are disabled", OFFLINE_ENV);
        }
        Ok(Self { client, offline })
    }

    async fn fetch_chart(
        &self,
        symbol: &str,
        query: &[(&str, String)],
    ) -> Result<ChartResult, ProviderError> {
        if self.offline {
            return Err(ProviderError::Offline);
        }

        let params: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        let url = format!("{}/{}?{}", CHART_BASE, symbol, params.join("&"));
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let data: YahooChartResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        first_result(data)
    }
}

impl MarketData for YahooClient {
    async fn dividend_history(&self, ticker: &str) -> Result<Vec<DividendEvent>, ProviderError> {
        info!("Fetching dividend history for {} from Yahoo Finance", ticker);
        let query = [
            ("range", "max".to_string()),
            ("interval", "1mo".to_string()),
            ("events", "div".to_string()),
        ];
        let result = self.fetch_chart(ticker, &query).await?;
        Ok(parse_dividends(ticker, &result))
    }

    async fn price_history(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceObservation>, ProviderError> {
        info!(
            "Fetching historical prices for {} from {} to {}",
            ticker, from, to
        );
        let result = self.fetch_chart(ticker, &daily_range(from, to)).await?;
        parse_closes(&result)
    }
}

impl FxSource for YahooClient {
    async fn closing_rates(
        &self,
        pair: &CurrencyPair,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceObservation>, ProviderError> {
        debug!("Fetching {} rates from {} to {}", pair, from, to);
        let result = self
            .fetch_chart(&pair.yahoo_symbol(), &daily_range(from, to))
            .await?;
        parse_closes(&result)
    }
}

/// Query for daily bars over `[from, to)`
fn daily_range(from: NaiveDate, to: NaiveDate) -> [(&'static str, String); 3] {
    let midnight = |date: NaiveDate| date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp());
    [
        ("period1", midnight(from).unwrap_or_default().to_string()),
        ("period2", midnight(to).unwrap_or_default().to_string()),
        ("interval", "1d".to_string()),
    ]
}

fn first_result(data: YahooChartResponse) -> Result<ChartResult, ProviderError> {
    if let Some(error) = data.chart.error {
        return Err(ProviderError::Api {
            code: error.code,
            description: error.description,
        });
    }

    data.chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ProviderError::Parse("no chart result returned".to_string()))
}

/// Calendar date of a timestamp in the exchange's own timezone
fn exchange_date(timestamp: i64, gmtoffset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp + gmtoffset, 0).map(|dt| dt.date_naive())
}

fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value).map(|d| d.normalize())
}

fn parse_dividends(ticker: &str, result: &ChartResult) -> Vec<DividendEvent> {
    let offset = result.meta.gmtoffset.unwrap_or(0);

    let mut events: Vec<DividendEvent> = result
        .events
        .as_ref()
        .and_then(|e| e.dividends.as_ref())
        .map(|dividends| {
            dividends
                .values()
                .filter_map(|payload| {
                    Some(DividendEvent {
                        ticker: ticker.to_string(),
                        ex_date: exchange_date(payload.date, offset)?,
                        amount: to_decimal(payload.amount)?,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    events.sort_by_key(|e| e.ex_date);
    debug!("Parsed {} dividend events for {}", events.len(), ticker);
    events
}

fn parse_closes(result: &ChartResult) -> Result<Vec<PriceObservation>, ProviderError> {
    let offset = result.meta.gmtoffset.unwrap_or(0);

    // No bars in the requested range
    let Some(timestamps) = result.timestamp.as_ref() else {
        return Ok(Vec::new());
    };

    let closes = result
        .indicators
        .quote
        .first()
        .and_then(|q| q.close.as_ref())
        .ok_or_else(|| ProviderError::Parse("no close prices".to_string()))?;

    let mut prices = Vec::with_capacity(timestamps.len());
    for (i, &timestamp) in timestamps.iter().enumerate() {
        let date = exchange_date(timestamp, offset)
            .ok_or_else(|| ProviderError::Parse(format!("invalid timestamp {}", timestamp)))?;

        // Yahoo reports null closes for halted days; they carry no price
        let Some(close) = closes.get(i).copied().flatten().and_then(to_decimal) else {
            debug!("Skipping empty close for {}", date);
            continue;
        };

        prices.push(PriceObservation { date, close });
    }

    prices.sort_by_key(|p| p.date);
    Ok(prices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn chart(json: &str) -> ChartResult {
        let data: YahooChartResponse = serde_json::from_str(json).unwrap();
        first_result(data).unwrap()
    }

    #[test]
    fn test_parse_dividends_uses_exchange_dates() {
        let result = chart(
            r#"{"chart":{"result":[{
                "meta":{"symbol":"XYZ","gmtoffset":-18000},
                "timestamp":[1704085200],
                "events":{"dividends":{
                    "1709303400":{"amount":0.5,"date":1709303400},
                    "1701441000":{"amount":0.48,"date":1701441000}
                }},
                "indicators":{"quote":[{"close":[101.5]}]}
            }],"error":null}}"#,
        );

        let events = parse_dividends("XYZ", &result);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].ex_date, NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
        assert_eq!(events[0].amount, dec!(0.48));
        assert_eq!(events[1].ex_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(events[1].amount, dec!(0.5));
    }

    #[test]
    fn test_parse_dividends_without_events_is_empty() {
        let result = chart(
            r#"{"chart":{"result":[{
                "meta":{"symbol":"NODIV","gmtoffset":-18000},
                "timestamp":[1704085200],
                "indicators":{"quote":[{"close":[10.0]}]}
            }],"error":null}}"#,
        );
        assert!(parse_dividends("NODIV", &result).is_empty());
    }

    #[test]
    fn test_parse_closes_skips_null_bars() {
        let result = chart(
            r#"{"chart":{"result":[{
                "meta":{"symbol":"USDKRW=X","gmtoffset":0},
                "timestamp":[1709251200, 1709510400, 1709596800],
                "indicators":{"quote":[{"close":[1331.25, null, 1333.5]}]}
            }],"error":null}}"#,
        );

        let closes = parse_closes(&result).unwrap();
        assert_eq!(closes.len(), 2);
        assert_eq!(closes[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(closes[0].close, dec!(1331.25));
        assert_eq!(closes[1].date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_api_error_is_reported() {
        let data: YahooChartResponse = serde_json::from_str(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        )
        .unwrap();

        match first_result(data) {
            Err(ProviderError::Api { code, .. }) => assert_eq!(code, "Not Found"),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    fn should_skip_online_tests() -> bool {
        std::env::var("PAYDAY_SKIP_ONLINE_TESTS")
            .map(|v| v != "0")
            .unwrap_or(false)
    }

    #[tokio::test]
    async fn test_fetch_dividend_history() {
        if should_skip_online_tests() {
            return;
        }

        let client = YahooClient::new().unwrap();
        let result = client.dividend_history("KO").await;
        if let Err(e) = &result {
            eprintln!("Skipping Yahoo dividend history test: {}", e);
            return;
        }
        let events = result.unwrap();

        assert!(!events.is_empty());
        assert!(events.windows(2).all(|w| w[0].ex_date <= w[1].ex_date));
    }
}
