use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::holdings::AccountHolding;
use super::settlement::SettlementDates;
use crate::pricing::{DividendEvent, FxQuote, RateSource};

/// Flat withholding applied to every dividend (15%)
pub const TAX_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// One dividend payment to one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerRecord {
    pub ex_date: NaiveDate,
    pub local_payment_date: NaiveDate,
    pub destination_payment_date: NaiveDate,
    pub ticker: String,
    /// Shares held by the account on the ex-date
    pub quantity: u64,
    pub prior_close: Decimal,
    pub yield_percent: Decimal,
    pub dividend_per_share: Decimal,
    pub gross_source: Decimal,
    pub net_source: Decimal,
    /// Whole units of the destination currency
    pub gross_destination: Decimal,
    pub net_destination: Decimal,
    pub fx_rate: Decimal,
    pub fx_source: RateSource,
    pub account: String,
}

impl LedgerRecord {
    pub fn build(
        event: &DividendEvent,
        dates: &SettlementDates,
        holding: &AccountHolding,
        prior_close: Decimal,
        quote: FxQuote,
    ) -> Self {
        let gross_source = Decimal::from(holding.quantity) * event.amount;
        let net_source = gross_source * (Decimal::ONE - TAX_RATE);

        Self {
            ex_date: dates.ex_date,
            local_payment_date: dates.local_payment,
            destination_payment_date: dates.destination_payment,
            ticker: event.ticker.clone(),
            quantity: holding.quantity,
            prior_close,
            yield_percent: dividend_yield(event.amount, prior_close),
            dividend_per_share: event.amount,
            gross_source,
            net_source,
            gross_destination: convert(gross_source, quote.rate),
            net_destination: convert(net_source, quote.rate),
            fx_rate: quote.rate,
            fx_source: quote.source,
            account: holding.account.clone(),
        }
    }
}

/// Dividend as a percentage of the prior close; zero without a price.
///
/// Kept at full precision, display code rounds.
pub fn dividend_yield(dividend_per_share: Decimal, prior_close: Decimal) -> Decimal {
    if prior_close.is_zero() {
        return Decimal::ZERO;
    }
    dividend_per_share / prior_close * Decimal::ONE_HUNDRED
}

/// Convert and round to whole destination units, half away from zero
pub fn convert(amount: Decimal, rate: Decimal) -> Decimal {
    (amount * rate).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
