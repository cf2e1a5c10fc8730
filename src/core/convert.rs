//! Amount conversion through a pivot currency and display formatting.

use crate::core::error::{RateError, Result};
use crate::core::rates::usable_rate;
use rust_decimal::prelude::*;
use std::collections::BTreeMap;

const INVALID_AMOUNT: &str = "Please enter a valid amount";
const ZERO_AMOUNT: &str = "Amount cannot be zero";

/// Parses user input such as `"1234.5"` or `"1,234.50"`.
pub fn parse_amount(text: &str) -> Result<Decimal> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(RateError::InvalidAmount(INVALID_AMOUNT.to_string()));
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| RateError::InvalidAmount(INVALID_AMOUNT.to_string()))
}

/// Checks an amount before a conversion is requested.
pub fn validate_amount(text: &str) -> Result<Decimal> {
    let amount = parse_amount(text)?;
    if amount.is_zero() {
        return Err(RateError::InvalidAmount(ZERO_AMOUNT.to_string()));
    }
    Ok(amount)
}

/// Converts `amount` of `from` into `to` given rates relative to one pivot.
///
/// Both currencies must be present in `rates`; the amount goes
/// `from -> pivot -> to`. The result is formatted with [`format_amount`].
pub fn convert_amount(
    amount: &str,
    from: &str,
    to: &str,
    rates: &BTreeMap<String, f64>,
) -> Result<String> {
    let amount = parse_amount(amount)?;
    let from_rate = decimal_rate(rates, from)?;
    let to_rate = decimal_rate(rates, to)?;

    let result = amount
        .checked_div(from_rate)
        .and_then(|pivot| pivot.checked_mul(to_rate))
        .ok_or_else(|| RateError::InvalidAmount("Amount is too large to convert".to_string()))?;

    Ok(format_amount(result))
}

fn decimal_rate(rates: &BTreeMap<String, f64>, code: &str) -> Result<Decimal> {
    let rate = usable_rate(rates, code)?;
    Decimal::from_f64(rate).ok_or_else(|| RateError::RateNotFound(code.to_string()))
}

/// Two decimal places, half-even rounding, comma-grouped thousands.
pub fn format_amount(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(2);
    let text = rounded.abs().to_string();

    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{frac_part}")
}
