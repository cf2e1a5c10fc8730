pub mod fixer;
pub mod http;
pub mod open_exchange;

use crate::core::RateProvider;
use crate::core::config::{AppConfig, ProviderKind};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

/// Builds the provider selected in `config`.
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn RateProvider>> {
    let timeout = config.timeout();
    debug!(provider = ?config.provider, ?timeout, "Building rate provider");

    let provider: Arc<dyn RateProvider> = match config.provider {
        ProviderKind::Fixer => {
            let fixer = config
                .providers
                .fixer
                .as_ref()
                .context("Provider 'fixer' selected but providers.fixer is not configured")?;
            Arc::new(fixer::FixerProvider::new(
                &fixer.base_url,
                &fixer.access_key,
                timeout,
            )?)
        }
        ProviderKind::OpenExchange => {
            let oxr = config.providers.open_exchange.as_ref().context(
                "Provider 'open_exchange' selected but providers.open_exchange is not configured",
            )?;
            Arc::new(open_exchange::OpenExchangeProvider::new(
                &oxr.base_url,
                &oxr.app_id,
                timeout,
            )?)
        }
    };
    Ok(provider)
}
