use crate::core::currency::{CurrencyCode, CurrencyRateProvider, validate_rate};
use crate::core::error::ProviderError;
use crate::providers::util::{get_json, http_client};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

const PROVIDER: &str = "Yahoo";

/// Rate-for-pair lookups against the Yahoo Finance chart API (`EURUSD=X`).
pub struct YahooRateProvider {
    base_url: String,
    client: reqwest::Client,
}

impl YahooRateProvider {
    pub fn new(base_url: &str) -> Self {
        YahooRateProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct YahooCurrencyResponse {
    chart: CurrencyChartResult,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartResult {
    result: Option<Vec<CurrencyChartItem>>,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartItem {
    meta: CurrencyChartMeta,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: f64,
}

#[async_trait]
impl CurrencyRateProvider for YahooRateProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    #[instrument(
        name = "YahooRateFetch",
        skip(self, from, to),
        fields(pair = %format!("{from}{to}"))
    )]
    async fn fetch_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<f64, ProviderError> {
        let symbol = format!("{from}{to}=X");
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);

        let data: YahooCurrencyResponse = get_json(&self.client, PROVIDER, &url).await?;

        let item = data
            .chart
            .result
            .and_then(|items| items.into_iter().next())
            .ok_or_else(|| {
                ProviderError::permanent(
                    PROVIDER,
                    None,
                    format!("No rate data found for currency pair: {symbol}"),
                )
            })?;

        validate_rate(PROVIDER, from, to, item.meta.regular_market_price)
    }
}
