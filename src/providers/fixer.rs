//! Fixer (fixer.io) rate provider.
//!
//! Fixer answers most failures with HTTP 200 and `{"success": false, "error": {...}}`,
//! so the envelope's `error.info` is the primary source of failure messages.

use crate::core::error::{RateError, Result};
use crate::core::mapper::ProviderEnvelope;
use crate::core::rates::{HistoricalRate, RateProvider, RateSet};
use crate::providers::http::{build_client, build_url, get_mapped};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::instrument;

pub const DEFAULT_BASE_URL: &str = "https://data.fixer.io/api";
const PIVOT: &str = "EUR";
const KEY_PARAM: &str = "access_key";

pub struct FixerProvider {
    base_url: String,
    access_key: String,
    client: reqwest::Client,
}

impl FixerProvider {
    pub fn new(base_url: &str, access_key: &str, timeout: Duration) -> Result<Self> {
        Ok(FixerProvider {
            base_url: base_url.to_string(),
            access_key: access_key.to_string(),
            client: build_client(timeout)?,
        })
    }

    async fn fetch_rates(&self, endpoint: &str, base: &str, targets: &[String]) -> Result<RateSet> {
        let symbols = targets.join(",");
        let url = build_url(
            &self.base_url,
            endpoint,
            &[
                (KEY_PARAM, self.access_key.as_str()),
                ("base", base),
                ("symbols", symbols.as_str()),
            ],
        )?;
        get_mapped::<RatesEnvelope>(&self.client, url, KEY_PARAM).await
    }
}

#[derive(Debug, Deserialize)]
struct FixerError {
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

impl FixerError {
    fn message(&self) -> String {
        self.info
            .clone()
            .or_else(|| self.kind.clone())
            .unwrap_or_else(|| "Unknown provider error".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct SymbolsEnvelope {
    symbols: Option<BTreeMap<String, String>>,
    error: Option<FixerError>,
}

impl ProviderEnvelope for SymbolsEnvelope {
    type Payload = Vec<String>;

    fn provider_error(&self) -> Option<String> {
        self.error.as_ref().map(FixerError::message)
    }

    fn into_payload(self) -> Option<Vec<String>> {
        self.symbols.map(|symbols| symbols.into_keys().collect())
    }
}

#[derive(Debug, Deserialize)]
struct RatesEnvelope {
    timestamp: Option<i64>,
    base: Option<String>,
    rates: Option<BTreeMap<String, f64>>,
    error: Option<FixerError>,
}

impl ProviderEnvelope for RatesEnvelope {
    type Payload = RateSet;

    fn provider_error(&self) -> Option<String> {
        self.error.as_ref().map(FixerError::message)
    }

    fn into_payload(self) -> Option<RateSet> {
        let rates = self.rates?;
        let timestamp = self
            .timestamp
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(Utc::now);
        let base = self.base.unwrap_or_else(|| PIVOT.to_string());
        Some(RateSet::new(timestamp, &base, rates))
    }
}

#[async_trait]
impl RateProvider for FixerProvider {
    fn name(&self) -> &'static str {
        "fixer"
    }

    fn base_currency(&self) -> &str {
        PIVOT
    }

    #[instrument(name = "FixerSymbols", skip(self))]
    async fn list_currencies(&self) -> Result<Vec<String>> {
        let url = build_url(
            &self.base_url,
            "symbols",
            &[(KEY_PARAM, self.access_key.as_str())],
        )?;
        get_mapped::<SymbolsEnvelope>(&self.client, url, KEY_PARAM).await
    }

    #[instrument(name = "FixerLatest", skip(self))]
    async fn get_current_rate(&self, base: &str, targets: &[String]) -> Result<RateSet> {
        self.fetch_rates("latest", base, targets).await
    }

    #[instrument(name = "FixerHistorical", skip(self), fields(date = %date))]
    async fn get_historical_rate(
        &self,
        date: NaiveDate,
        base: &str,
        targets: &[String],
    ) -> Result<HistoricalRate> {
        let target = targets
            .first()
            .ok_or_else(|| RateError::Unexpected("No target currency requested".to_string()))?;
        let endpoint = date.format("%Y-%m-%d").to_string();
        let set = self.fetch_rates(&endpoint, base, targets).await?;
        Ok(HistoricalRate {
            date,
            base: base.to_string(),
            target: target.clone(),
            rate: set.cross_rate(base, target)?,
        })
    }
}
