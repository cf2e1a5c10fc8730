//! Open Exchange Rates (openexchangerates.org) rate provider.
//!
//! Rates are always published against USD; cross rates for other bases are
//! derived by the caller through the pivot. Errors come back with a non-2xx
//! status and `{"error": true, "message": ..., "description": ...}`.

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

pub const DEFAULT_BASE_URL: &str = "https://openexchangerates.org/api";
const PIVOT: &str = "USD";
const KEY_PARAM: &str = "app_id";

pub struct OpenExchangeProvider {
    base_url: String,
    app_id: String,
    client: reqwest::Client,
}

impl OpenExchangeProvider {
    pub fn new(base_url: &str, app_id: &str, timeout: Duration) -> Result<Self> {
        Ok(OpenExchangeProvider {
            base_url: base_url.to_string(),
            app_id: app_id.to_string(),
            client: build_client(timeout)?,
        })
    }

    async fn fetch_rates(&self, endpoint: &str, targets: &[String]) -> Result<RateSet> {
        let symbols = targets.join(",");
        let url = build_url(
            &self.base_url,
            endpoint,
            &[
                (KEY_PARAM, self.app_id.as_str()),
                ("symbols", symbols.as_str()),
            ],
        )?;
        get_mapped::<RatesEnvelope>(&self.client, url, KEY_PARAM).await
    }
}

#[derive(Debug, Deserialize)]
struct OxrError {
    error: bool,
    message: Option<String>,
    description: Option<String>,
}

impl OxrError {
    fn message(&self) -> Option<String> {
        if !self.error {
            return None;
        }
        Some(
            self.description
                .clone()
                .or_else(|| self.message.clone())
                .unwrap_or_else(|| "Unknown provider error".to_string()),
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CurrenciesEnvelope {
    Error(OxrError),
    Currencies(BTreeMap<String, String>),
}

impl ProviderEnvelope for CurrenciesEnvelope {
    type Payload = Vec<String>;

    fn provider_error(&self) -> Option<String> {
        match self {
            CurrenciesEnvelope::Error(e) => e.message(),
            CurrenciesEnvelope::Currencies(_) => None,
        }
    }

    fn into_payload(self) -> Option<Vec<String>> {
        match self {
            CurrenciesEnvelope::Currencies(map) if !map.is_empty() => {
                Some(map.into_keys().collect())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RatesEnvelope {
    timestamp: Option<i64>,
    base: Option<String>,
    rates: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    error: bool,
    message: Option<String>,
    description: Option<String>,
}

impl ProviderEnvelope for RatesEnvelope {
    type Payload = RateSet;

    fn provider_error(&self) -> Option<String> {
        OxrError {
            error: self.error,
            message: self.message.clone(),
            description: self.description.clone(),
        }
        .message()
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
impl RateProvider for OpenExchangeProvider {
    fn name(&self) -> &'static str {
        "open_exchange"
    }

    fn base_currency(&self) -> &str {
        PIVOT
    }

    #[instrument(name = "OxrCurrencies", skip(self))]
    async fn list_currencies(&self) -> Result<Vec<String>> {
        let url = build_url(&self.base_url, "currencies.json", &[])?;
        get_mapped::<CurrenciesEnvelope>(&self.client, url, KEY_PARAM).await
    }

    #[instrument(name = "OxrLatest", skip(self))]
    async fn get_current_rate(&self, _base: &str, targets: &[String]) -> Result<RateSet> {
        self.fetch_rates("latest.json", targets).await
    }

    #[instrument(name = "OxrHistorical", skip(self), fields(date = %date))]
    async fn get_historical_rate(
        &self,
        date: NaiveDate,
        base: &str,
        targets: &[String],
    ) -> Result<HistoricalRate> {
        let target = targets
            .first()
            .ok_or_else(|| RateError::Unexpected("No target currency requested".to_string()))?;
        let endpoint = format!("historical/{}.json", date.format("%Y-%m-%d"));
        let set = self.fetch_rates(&endpoint, targets).await?;
        Ok(HistoricalRate {
            date,
            base: base.to_string(),
            target: target.clone(),
            rate: set.cross_rate(base, target)?,
        })
    }
}
