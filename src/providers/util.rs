use crate::core::error::ProviderError;
use serde::de::DeserializeOwned;
use tracing::debug;

/// User agent sent with every provider request.
pub const USER_AGENT: &str = concat!("fxval/", env!("CARGO_PKG_VERSION"));

/// Builds the shared HTTP client for a provider.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Performs one GET and decodes the JSON body.
///
/// Transport errors are transient, HTTP errors are classified by status and
/// an unreadable body is transient. There is no retry.
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    provider: &str,
    url: &str,
) -> Result<T, ProviderError> {
    debug!("Requesting {} from {}", provider, url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ProviderError::from_reqwest(provider, e))?;

    let status = response.status();
    debug!(%status, "Received {} response", provider);

    let text = response
        .text()
        .await
        .map_err(|e| ProviderError::from_reqwest(provider, e))?;

    if !status.is_success() {
        return Err(ProviderError::from_status(
            provider,
            status.as_u16(),
            error_message(&text).unwrap_or_else(|| status.to_string()),
        ));
    }

    serde_json::from_str(&text).map_err(|e| {
        ProviderError::transient(
            provider,
            Some(status.as_u16()),
            format!("Failed to parse JSON response: {e}"),
        )
    })
}

/// Pulls a human readable message out of a JSON error body, if there is one.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_string))
        .or_else(|| {
            value
                .pointer("/chart/error/description")
                .and_then(|v| v.as_str())
                .map(str::to_string)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Body {
        value: f64,
    }

    async fn server_with(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let server = server_with(200, r#"{"value": 4.2}"#).await;
        let body: Body = get_json(&http_client(), "Test", &format!("{}/data", server.uri()))
            .await
            .unwrap();
        assert_eq!(body.value, 4.2);
    }

    #[tokio::test]
    async fn test_get_json_uses_error_message_from_body() {
        let server = server_with(404, r#"{"message": "not found"}"#).await;
        let err = get_json::<Body>(&http_client(), "Test", &format!("{}/data", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::permanent("Test", Some(404), "not found"));
    }

    #[tokio::test]
    async fn test_get_json_server_error_is_transient() {
        let server = server_with(502, "bad gateway").await;
        let err = get_json::<Body>(&http_client(), "Test", &format!("{}/data", server.uri()))
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert_eq!(err.status(), Some(502));
    }

    #[tokio::test]
    async fn test_get_json_connection_refused_is_transient() {
        // Nothing listens on port 1
        let err = get_json::<Body>(&http_client(), "Test", "http://127.0.0.1:1/data")
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert_eq!(err.status(), None);
    }
}
