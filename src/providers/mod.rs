pub mod endpoint;
pub mod frankfurter;
pub mod util;
pub mod yahoo_finance;

use crate::core::config::{ProvidersConfig, RateSource};
use crate::core::currency::CurrencyRateProvider;
use anyhow::{Context, Result};
use endpoint::EndpointRateProvider;
use frankfurter::FrankfurterRateProvider;
use std::sync::Arc;
use yahoo_finance::YahooRateProvider;

const DEFAULT_YAHOO_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_FRANKFURTER_URL: &str = "https://api.frankfurter.dev/v1";

/// Instantiates the rate source selected by `providers.rates`.
pub fn build_rate_provider(config: &ProvidersConfig) -> Result<Arc<dyn CurrencyRateProvider>> {
    let provider: Arc<dyn CurrencyRateProvider> = match config.rates {
        RateSource::Yahoo => {
            let base_url = config
                .yahoo
                .as_ref()
                .map_or(DEFAULT_YAHOO_URL, |p| p.base_url.as_str());
            Arc::new(YahooRateProvider::new(base_url))
        }
        RateSource::Frankfurter => {
            let base_url = config
                .frankfurter
                .as_ref()
                .map_or(DEFAULT_FRANKFURTER_URL, |p| p.base_url.as_str());
            Arc::new(FrankfurterRateProvider::new(base_url))
        }
        RateSource::Endpoint => {
            let endpoint = config
                .endpoint
                .as_ref()
                .context("providers.endpoint.base_url is required when rates is 'endpoint'")?;
            Arc::new(EndpointRateProvider::new(&endpoint.base_url))
        }
    };
    Ok(provider)
}
