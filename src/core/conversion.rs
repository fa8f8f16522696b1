//! Resolves single `(amount, from, to)` requests through the rate cache,
//! falling back to the remote provider on a miss or a stale entry.

use crate::core::cache::RateCache;
use crate::core::currency::{CurrencyCode, CurrencyRateProvider};
use crate::core::error::{ConversionError, ProviderError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Upper bound on a single provider round trip.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub rate: f64,
    pub amount: Option<f64>,
    pub converted_amount: Option<f64>,
    #[serde(rename = "timestamp")]
    pub resolved_at: DateTime<Utc>,
}

impl ConversionResult {
    fn new(from: CurrencyCode, to: CurrencyCode, rate: f64, amount: Option<f64>) -> Self {
        ConversionResult {
            from,
            to,
            rate,
            amount,
            converted_amount: amount.map(|a| a * rate),
            resolved_at: Utc::now(),
        }
    }
}

/// Stateless apart from the shared cache; clone it freely across tasks.
#[derive(Clone)]
pub struct ConversionService {
    cache: Arc<RateCache>,
    provider: Arc<dyn CurrencyRateProvider>,
    timeout: Duration,
}

impl ConversionService {
    pub fn new(cache: Arc<RateCache>, provider: Arc<dyn CurrencyRateProvider>) -> Self {
        Self::with_timeout(cache, provider, DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(
        cache: Arc<RateCache>,
        provider: Arc<dyn CurrencyRateProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            cache,
            provider,
            timeout,
        }
    }

    pub fn cache(&self) -> &Arc<RateCache> {
        &self.cache
    }

    /// Converts `amount` (or just resolves the rate when `amount` is `None`).
    ///
    /// Provider failures are returned as [`ConversionError::ConversionFailed`];
    /// no rate is ever made up here.
    #[instrument(name = "Convert", skip(self, from, to), fields(from = %from, to = %to))]
    pub async fn convert(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        amount: Option<f64>,
    ) -> Result<ConversionResult, ConversionError> {
        if let Some(a) = amount {
            if !a.is_finite() {
                return Err(ConversionError::InvalidRequest(format!(
                    "amount must be a finite number, got {a}"
                )));
            }
        }

        if from == to {
            return Ok(ConversionResult::new(from.clone(), to.clone(), 1.0, amount));
        }

        let pair = (from.clone(), to.clone());
        if let Some(entry) = self.cache.get_fresh(&pair, Utc::now()) {
            debug!("Using cached rate {} for {}/{}", entry.rate, from, to);
            return Ok(ConversionResult::new(
                from.clone(),
                to.clone(),
                entry.rate,
                amount,
            ));
        }

        let rate = self.fetch(from, to).await.map_err(|source| {
            if source.is_transient() {
                warn!(error = %source, "Transient rate provider failure for {}/{}", from, to);
            } else {
                error!(error = %source, "Permanent rate provider failure for {}/{}", from, to);
            }
            ConversionError::ConversionFailed {
                from: from.clone(),
                to: to.clone(),
                source,
            }
        })?;

        self.cache.put(pair, rate, Utc::now());
        Ok(ConversionResult::new(from.clone(), to.clone(), rate, amount))
    }

    /// Same as [`ConversionService::convert`] with codes given as raw strings.
    pub async fn convert_str(
        &self,
        from: &str,
        to: &str,
        amount: Option<f64>,
    ) -> Result<ConversionResult, ConversionError> {
        let from = CurrencyCode::parse(from)?;
        let to = CurrencyCode::parse(to)?;
        self.convert(&from, &to, amount).await
    }

    async fn fetch(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<f64, ProviderError> {
        info!("Fetching rate {}/{} from {}", from, to, self.provider.name());
        match tokio::time::timeout(self.timeout, self.provider.fetch_rate(from, to)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                provider: self.provider.name().to_string(),
                after: self.timeout,
            }),
        }
    }
}
