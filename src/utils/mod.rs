//! Utility functions for formatting and common operations
//!
//! Centralized formatting for the two currencies of the ledger and for the
//! masked account numbers shown in reports.

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency display options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    /// "$" prefix, two decimal places
    Usd,
    /// "₩" prefix, whole won
    Krw,
    /// No symbol, two decimal places
    None,
}

impl CurrencySymbol {
    fn prefix(self) -> &'static str {
        match self {
            CurrencySymbol::Usd => "$",
            CurrencySymbol::Krw => "₩",
            CurrencySymbol::None => "",
        }
    }

    fn decimal_places(self) -> u32 {
        match self {
            CurrencySymbol::Krw => 0,
            CurrencySymbol::Usd | CurrencySymbol::None => 2,
        }
    }
}

/// Core formatting function with full control over output.
///
/// Uses `,` as the thousands separator and `.` as the decimal separator,
/// rounding half away from zero to the currency's precision.
///
/// # Examples
/// ```
/// use payday::utils::{format_amount_with_width, CurrencySymbol};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(
///     format_amount_with_width(dec!(1234.565), 0, CurrencySymbol::Usd),
///     "$1,234.57"
/// );
///
/// assert_eq!(
///     format_amount_with_width(dec!(5737), 10, CurrencySymbol::Krw),
///     "    ₩5,737"
/// );
/// ```
pub fn format_amount_with_width(value: Decimal, width: usize, symbol: CurrencySymbol) -> String {
    let places = symbol.decimal_places();
    let rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };

    let formatted = format!("{:.*}", places as usize, rounded.abs());
    let (integer_part, decimal_part) = match formatted.split_once('.') {
        Some((int, dec)) => (int, Some(dec)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer_part.len() + integer_part.len() / 3);
    for (i, c) in integer_part.chars().enumerate() {
        if i > 0 && (integer_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let result = match decimal_part {
        Some(dec) => format!("{}{}{}.{}", sign, symbol.prefix(), grouped, dec),
        None => format!("{}{}{}", sign, symbol.prefix(), grouped),
    };

    // Right-align; count chars since "₩" is multi-byte
    let len = result.chars().count();
    if width > len {
        format!("{}{}", " ".repeat(width - len), result)
    } else {
        result
    }
}

/// Format as US dollars: "$1,234.56"
///
/// # Examples
/// ```
/// use payday::utils::format_usd;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_usd(dec!(4.25)), "$4.25");
/// assert_eq!(format_usd(dec!(-1000)), "-$1,000.00");
/// ```
pub fn format_usd(value: Decimal) -> String {
    format_amount_with_width(value, 0, CurrencySymbol::Usd)
}

/// Format as whole won: "₩1,234"
///
/// # Examples
/// ```
/// use payday::utils::format_krw;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_krw(dec!(1234567)), "₩1,234,567");
/// ```
pub fn format_krw(value: Decimal) -> String {
    format_amount_with_width(value, 0, CurrencySymbol::Krw)
}

/// Format a plain number with two decimals: "1,329.12"
pub fn format_number(value: Decimal) -> String {
    format_amount_with_width(value, 0, CurrencySymbol::None)
}

/// Format a percentage with two decimals: "0.50%"
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", format_number(value))
}

/// Number of trailing account characters left visible by [`mask_account`]
pub const ACCOUNT_VISIBLE_CHARS: usize = 5;

/// Hide all but the last five characters of an account number.
///
/// # Examples
/// ```
/// use payday::utils::mask_account;
///
/// assert_eq!(mask_account("1234567890"), "*****67890");
/// assert_eq!(mask_account("A-1"), "A-1");
/// ```
pub fn mask_account(account: &str) -> String {
    let total = account.chars().count();
    let hidden = total.saturating_sub(ACCOUNT_VISIBLE_CHARS);
    account
        .chars()
        .enumerate()
        .map(|(i, c)| if i < hidden { '*' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_usd_basic() {
        assert_eq!(format_usd(dec!(1234.56)), "$1,234.56");
        assert_eq!(format_usd(dec!(0.99)), "$0.99");
        assert_eq!(format_usd(dec!(1000000)), "$1,000,000.00");
        assert_eq!(format_usd(dec!(0)), "$0.00");
    }

    #[test]
    fn test_format_usd_rounds_half_away_from_zero() {
        assert_eq!(format_usd(dec!(1.005)), "$1.01");
        assert_eq!(format_usd(dec!(-1.005)), "-$1.01");
        assert_eq!(format_usd(dec!(1.004)), "$1.00");
    }

    #[test]
    fn test_format_krw_has_no_decimals() {
        assert_eq!(format_krw(dec!(6615)), "₩6,615");
        assert_eq!(format_krw(dec!(999)), "₩999");
        assert_eq!(format_krw(dec!(5737.5)), "₩5,738");
        assert_eq!(format_krw(dec!(-123456)), "-₩123,456");
    }

    #[test]
    fn test_format_with_width() {
        let result = format_amount_with_width(dec!(100), 10, CurrencySymbol::Usd);
        assert_eq!(result, "   $100.00");
        // already wider than requested
        assert_eq!(
            format_amount_with_width(dec!(1000000), 5, CurrencySymbol::Usd),
            "$1,000,000.00"
        );
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(0.5)), "0.50%");
        assert_eq!(format_percent(dec!(12.3456)), "12.35%");
    }

    #[test]
    fn test_mask_account() {
        assert_eq!(mask_account("110-123-456789"), "*********56789");
        assert_eq!(mask_account("12345"), "12345");
        assert_eq!(mask_account(""), "");
    }
}
