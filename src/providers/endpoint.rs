use crate::core::currency::{CurrencyCode, CurrencyRateProvider, validate_rate};
use crate::core::error::ProviderError;
use crate::providers::util::{get_json, http_client};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

const PROVIDER: &str = "Endpoint";

/// Reads rates from another instance's `GET /convert` endpoint.
pub struct EndpointRateProvider {
    base_url: String,
    client: reqwest::Client,
}

impl EndpointRateProvider {
    pub fn new(base_url: &str) -> Self {
        EndpointRateProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(),
        }
    }
}

#[derive(Deserialize)]
struct ConvertResponse {
    rate: f64,
}

#[async_trait]
impl CurrencyRateProvider for EndpointRateProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    #[instrument(
        name = "EndpointRateFetch",
        skip(self, from, to),
        fields(pair = %format!("{from}{to}"))
    )]
    async fn fetch_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<f64, ProviderError> {
        let url = format!("{}/convert?from={from}&to={to}", self.base_url);
        let resp: ConvertResponse = get_json(&self.client, PROVIDER, &url).await?;
        validate_rate(PROVIDER, from, to, resp.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn code(c: &str) -> CurrencyCode {
        CurrencyCode::parse(c).unwrap()
    }

    async fn create_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/convert"))
            .and(query_param("from", "USD"))
            .and(query_param("to", "INR"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_reads_rate_from_endpoint() {
        let body = r#"{
            "from": "USD", "to": "INR", "rate": 83.2,
            "amount": null, "convertedAmount": null,
            "timestamp": "2026-10-19T10:00:00Z"
        }"#;
        let mock_server = create_mock_server(200, body).await;
        let provider = EndpointRateProvider::new(&format!("{}/", mock_server.uri()));

        let rate = provider
            .fetch_rate(&code("USD"), &code("INR"))
            .await
            .unwrap();
        assert_eq!(rate, 83.2);
    }

    #[tokio::test]
    async fn test_upstream_error_keeps_status_and_message() {
        let body = r#"{"error": "Rate provider unavailable", "details": {"status": 500}}"#;
        let mock_server = create_mock_server(500, body).await;
        let provider = EndpointRateProvider::new(&mock_server.uri());

        let err = provider
            .fetch_rate(&code("USD"), &code("INR"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ProviderError::transient(PROVIDER, Some(500), "Rate provider unavailable")
        );
    }

    #[tokio::test]
    async fn test_bad_request_is_permanent() {
        let mock_server = create_mock_server(400, r#"{"error": "Invalid currency"}"#).await;
        let provider = EndpointRateProvider::new(&mock_server.uri());

        let err = provider
            .fetch_rate(&code("USD"), &code("INR"))
            .await
            .unwrap_err();
        assert!(!err.is_transient());
        assert_eq!(err.status(), Some(400));
    }
}
