//! Exchange rate abstractions and core types

use crate::core::error::{RateError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A point-in-time set of rates, all relative to `base`.
///
/// Providers always include `base` itself at 1.0 so pivot conversions work
/// for any pair in the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSet {
    pub timestamp: DateTime<Utc>,
    pub base: String,
    pub rates: BTreeMap<String, f64>,
}

impl RateSet {
    pub fn new(timestamp: DateTime<Utc>, base: &str, mut rates: BTreeMap<String, f64>) -> Self {
        rates.entry(base.to_string()).or_insert(1.0);
        RateSet {
            timestamp,
            base: base.to_string(),
            rates,
        }
    }

    /// Units of `to` per one unit of `from`, derived through the pivot.
    pub fn cross_rate(&self, from: &str, to: &str) -> Result<f64> {
        let from_rate = usable_rate(&self.rates, from)?;
        let to_rate = usable_rate(&self.rates, to)?;
        Ok(to_rate / from_rate)
    }
}

pub(crate) fn usable_rate(rates: &BTreeMap<String, f64>, code: &str) -> Result<f64> {
    match rates.get(code) {
        Some(rate) if rate.is_finite() && *rate > 0.0 => Ok(*rate),
        _ => Err(RateError::RateNotFound(code.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRate {
    pub date: NaiveDate,
    pub base: String,
    pub target: String,
    pub rate: f64,
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// The pivot currency this provider publishes rates against.
    fn base_currency(&self) -> &str;

    async fn list_currencies(&self) -> Result<Vec<String>>;

    async fn get_current_rate(&self, base: &str, targets: &[String]) -> Result<RateSet>;

    /// Rate of `base` into the first of `targets` as observed on `date`.
    async fn get_historical_rate(
        &self,
        date: NaiveDate,
        base: &str,
        targets: &[String],
    ) -> Result<HistoricalRate>;
}

/// Request symbols for a pair: the target, plus the base when it differs.
pub fn pair_symbols(base: &str, target: &str) -> Vec<String> {
    let mut symbols = vec![target.to_string()];
    if base != target {
        symbols.push(base.to_string());
    }
    symbols
}
