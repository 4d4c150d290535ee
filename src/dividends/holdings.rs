use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::portfolio::Lot;

/// Shares of one ticker held by one account on an ex-dividend date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountHolding {
    pub account: String,
    pub quantity: u64,
}

/// Sum the lots of `ticker` bought on or before `ex_date`, per account.
///
/// Lots bought after the ex-date are not entitled to the dividend. The result
/// is sorted by account and empty when no lot qualifies.
pub fn holdings_by_account(lots: &[Lot], ticker: &str, ex_date: NaiveDate) -> Vec<AccountHolding> {
    let mut by_account: BTreeMap<&str, u64> = BTreeMap::new();

    for lot in lots
        .iter()
        .filter(|lot| lot.matches_ticker(ticker) && lot.purchase_date <= ex_date)
    {
        *by_account.entry(lot.account.as_str()).or_default() += u64::from(lot.quantity);
    }

    by_account
        .into_iter()
        .map(|(account, quantity)| AccountHolding {
            account: account.to_string(),
            quantity,
        })
        .collect()
}
