//! Conversion orchestration and state reconciliation.
//!
//! [`ConversionOrchestrator`] owns the single [`ConversionState`] record and is
//! the only thing that replaces it. Consumers read snapshots through
//! [`ConversionOrchestrator::subscribe`]; user intents come back in through the
//! operation methods. No operation returns an error: every failure is folded
//! into `error_message` and the matching busy flag is cleared.

use crate::core::convert::convert_amount;
use crate::core::error::RateError;
use crate::core::history::{HistoryPoint, HistoryWindow};
use crate::core::rates::{HistoricalRate, RateProvider, pair_symbols};
use crate::core::state::ConversionState;
use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct Inner {
    provider: Arc<dyn RateProvider>,
    window: HistoryWindow,
    state: watch::Sender<ConversionState>,
    /// Bumped on every history request; only the latest may publish.
    history_generation: AtomicU64,
}

#[derive(Clone)]
pub struct ConversionOrchestrator {
    inner: Arc<Inner>,
}

impl ConversionOrchestrator {
    /// Creates the orchestrator with default state. `base` overrides the
    /// provider's pivot as the preselected source currency.
    pub fn new(provider: Arc<dyn RateProvider>, window: HistoryWindow, base: Option<&str>) -> Self {
        let base = base.unwrap_or_else(|| provider.base_currency()).to_string();
        let (state, _) = watch::channel(ConversionState::with_base(&base));
        ConversionOrchestrator {
            inner: Arc::new(Inner {
                provider,
                window,
                state,
                history_generation: AtomicU64::new(0),
            }),
        }
    }

    /// Creates the orchestrator and loads the currency list in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(provider: Arc<dyn RateProvider>, window: HistoryWindow, base: Option<&str>) -> Self {
        let orchestrator = Self::new(provider, window, base);
        orchestrator.replace(|s| s.is_loading_conversion = true);
        let init = orchestrator.clone();
        tokio::spawn(async move { init.initialize().await });
        orchestrator
    }

    pub fn subscribe(&self) -> watch::Receiver<ConversionState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> ConversionState {
        self.inner.state.borrow().clone()
    }

    pub fn provider_name(&self) -> &'static str {
        self.inner.provider.name()
    }

    /// Swaps in a new record built from a copy of the current one.
    fn replace(&self, update: impl FnOnce(&mut ConversionState)) {
        self.publish_if(|next| {
            update(next);
            true
        });
    }

    /// Like [`Self::replace`], but the update may decline by returning false.
    fn publish_if(&self, update: impl FnOnce(&mut ConversionState) -> bool) {
        self.inner.state.send_if_modified(|current| {
            let mut next = current.clone();
            if update(&mut next) {
                *current = next;
                true
            } else {
                false
            }
        });
    }

    pub async fn initialize(&self) {
        self.replace(|s| s.is_loading_conversion = true);
        let provider = self.inner.provider.name();
        debug!(provider, "Loading supported currencies");

        match self.inner.provider.list_currencies().await {
            Ok(mut currencies) => {
                currencies.sort();
                currencies.dedup();
                info!(provider, count = currencies.len(), "Loaded currencies");
                self.replace(|s| {
                    s.currencies = currencies;
                    s.is_loading_conversion = false;
                    s.error_message = None;
                });
            }
            Err(e) => {
                warn!(provider, kind = ?e.kind(), error = ?e, "Failed to load currencies");
                self.replace(|s| {
                    s.is_loading_conversion = false;
                    s.error_message = Some(e.to_string());
                });
            }
        }
    }

    pub fn select_currency_from(&self, code: &str) {
        let code = code.to_string();
        self.replace(|s| s.selected_currency_from = code);
    }

    pub fn set_amount_from(&self, text: &str) {
        let text = text.to_string();
        self.replace(|s| s.amount_from = text);
    }

    /// Selects the target currency and starts loading its rate history.
    ///
    /// `is_loading_history` is already set when this returns. The returned
    /// handle completes once the history fetch has reconciled.
    pub fn select_currency_to(&self, code: &str) -> JoinHandle<()> {
        let generation = self.next_generation();
        let target = code.to_string();
        let mut base = String::new();
        self.replace(|s| {
            base = s.selected_currency_from.clone();
            s.selected_currency_to = target.clone();
            s.history_points.clear();
            s.is_loading_history = true;
        });

        let this = self.clone();
        tokio::spawn(async move { this.history_for(generation, &base, &target).await })
    }

    pub async fn convert(&self, base: &str, target: &str) {
        self.replace(|s| s.is_loading_conversion = true);
        let targets = pair_symbols(base, target);
        debug!(%base, %target, "Requesting current rate");

        let rate_set = match self.inner.provider.get_current_rate(base, &targets).await {
            Ok(set) => set,
            Err(e) => {
                warn!(%base, %target, kind = ?e.kind(), error = ?e, "Failed to fetch current rate");
                self.replace(|s| {
                    s.is_loading_conversion = false;
                    s.error_message = Some(e.to_string());
                });
                return;
            }
        };

        let amount = self.snapshot().amount_from;
        let converted = convert_amount(&amount, base, target, &rate_set.rates)
            .and_then(|amount_to| Ok((rate_set.cross_rate(base, target)?, amount_to)));

        match converted {
            Ok((rate, amount_to)) => {
                debug!(%amount, %amount_to, rate, "Converted amount");
                self.replace(|s| {
                    s.current_rate = Some(rate);
                    s.rate_timestamp = Some(rate_set.timestamp);
                    s.amount_to = amount_to;
                    s.is_loading_conversion = false;
                    s.error_message = None;
                });
            }
            Err(e) => {
                warn!(%amount, kind = ?e.kind(), error = ?e, "Failed to convert amount");
                self.replace(|s| {
                    s.is_loading_conversion = false;
                    s.error_message = Some(e.to_string());
                });
            }
        }
    }

    /// Fetches and publishes the rate history for `base -> target`.
    pub async fn fetch_history(&self, base: &str, target: &str) {
        let generation = self.next_generation();
        self.replace(|s| s.is_loading_history = true);
        self.history_for(generation, base, target).await;
    }

    fn next_generation(&self) -> u64 {
        self.inner.history_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.history_generation.load(Ordering::SeqCst) == generation
    }

    async fn history_for(&self, generation: u64, base: &str, target: &str) {
        let outcome = match self.inner.window.sample_dates(Utc::now().date_naive()) {
            Ok(dates) => self.gather_history(&dates, base, target, generation).await,
            Err(e) => Err(e),
        };

        self.publish_if(|s| {
            if !self.is_current(generation) {
                debug!(%base, %target, generation, "Discarding superseded history");
                return false;
            }
            match outcome {
                Ok(points) => {
                    s.history_points = points;
                    s.error_message = None;
                }
                Err(e) => {
                    warn!(%base, %target, kind = ?e.kind(), "History unavailable");
                    s.error_message = Some(e.to_string());
                }
            }
            s.is_loading_history = false;
            true
        });
    }

    async fn gather_history(
        &self,
        dates: &[NaiveDate],
        base: &str,
        target: &str,
        generation: u64,
    ) -> Result<Vec<HistoryPoint>, RateError> {
        let targets = pair_symbols(base, target);
        debug!(%base, %target, samples = dates.len(), generation, "Fetching rate history");

        let requests = dates.iter().enumerate().map(|(index, date)| {
            let provider = Arc::clone(&self.inner.provider);
            let targets = &targets;
            async move {
                let result = provider.get_historical_rate(*date, base, targets).await;
                (index, result)
            }
        });
        let results = join_all(requests).await;
        fold_history(dates, results)
    }

    /// Resolves once the currency list has loaded or failed to load.
    pub async fn ready(&self) {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so the channel cannot close while waiting
        let _ = rx.wait_for(|s| !s.is_loading_conversion).await;
    }
}

/// Pairs each result with its sample date and keeps successes, oldest first.
fn fold_history(
    dates: &[NaiveDate],
    mut results: Vec<(usize, Result<HistoricalRate, RateError>)>,
) -> Result<Vec<HistoryPoint>, RateError> {
    results.sort_by_key(|(index, _)| *index);

    let points: Vec<HistoryPoint> = results
        .into_iter()
        .filter_map(|(index, result)| match result {
            Ok(rate) => Some(HistoryPoint::new(dates[index], rate.rate)),
            Err(e) => {
                warn!(date = %dates[index], error = ?e, "Dropping failed history sample");
                None
            }
        })
        .collect();

    if points.is_empty() {
        return Err(RateError::AggregateFailure);
    }
    Ok(points)
}
