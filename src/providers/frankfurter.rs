use crate::core::currency::{CurrencyCode, CurrencyRateProvider, validate_rate};
use crate::core::error::ProviderError;
use crate::providers::util::{get_json, http_client};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::instrument;

const PROVIDER: &str = "Frankfurter";

/// Frankfurter API (ECB reference rates, no API key).
///
/// Answers "all rates for a base currency"; we ask for a single symbol and
/// pick it out of the `rates` map.
pub struct FrankfurterRateProvider {
    base_url: String,
    client: reqwest::Client,
}

impl FrankfurterRateProvider {
    pub fn new(base_url: &str) -> Self {
        FrankfurterRateProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(),
        }
    }
}

#[derive(Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

#[async_trait]
impl CurrencyRateProvider for FrankfurterRateProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    #[instrument(
        name = "FrankfurterRateFetch",
        skip(self, from, to),
        fields(pair = %format!("{from}{to}"))
    )]
    async fn fetch_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<f64, ProviderError> {
        let url = format!("{}/latest?base={from}&symbols={to}", self.base_url);

        let resp: RatesResponse = get_json(&self.client, PROVIDER, &url).await?;

        let rate = resp.rates.get(to.as_str()).copied().ok_or_else(|| {
            ProviderError::permanent(PROVIDER, None, format!("No rate found for {from} → {to}"))
        })?;
        validate_rate(PROVIDER, from, to, rate)
    }
}
