//! HTTP conversion endpoint.
//!
//! `GET /convert?from=USD&to=EUR&amount=10` answers with a
//! [`ConversionResult`]; failures are reported as `{ error, details }`.

use crate::core::conversion::{ConversionResult, ConversionService};
use crate::core::currency::CurrencyCode;
use crate::core::error::{ConversionError, ProviderError};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::SocketAddr;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub conversion: ConversionService,
}

impl AppState {
    pub fn new(conversion: ConversionService) -> Self {
        Self { conversion }
    }
}

/// Create the router for the conversion endpoint
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/convert", get(convert))
        .with_state(state)
}

/// Start the web server and serve until Ctrl-C.
pub async fn start_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Conversion endpoint listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[derive(Debug, Deserialize)]
pub struct ConvertParams {
    from: Option<String>,
    to: Option<String>,
    amount: Option<String>,
}

/// Error body shared by every failure of the endpoint.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    details: Option<Value>,
}

impl ApiError {
    fn bad_request(error: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
            details: None,
        }
    }
}

impl From<ConversionError> for ApiError {
    fn from(e: ConversionError) -> Self {
        match e {
            ConversionError::InvalidRequest(message) => ApiError::bad_request(message),
            ConversionError::ConversionFailed { from, to, source } => {
                let status = match (&source, source.status()) {
                    (ProviderError::Timeout { .. }, _) => StatusCode::GATEWAY_TIMEOUT,
                    (_, Some(code)) => StatusCode::from_u16(code)
                        .ok()
                        .filter(|s| s.is_client_error() || s.is_server_error())
                        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                    (_, None) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                ApiError {
                    status,
                    error: "Failed to fetch exchange rate".to_string(),
                    details: Some(json!({
                        "from": from,
                        "to": to,
                        "provider": source.provider(),
                        "status": source.status(),
                        "transient": source.is_transient(),
                        "message": source.to_string(),
                    })),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "error": self.error });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

fn required_code(value: Option<&str>, name: &str) -> Result<CurrencyCode, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => CurrencyCode::parse(raw).map_err(ApiError::from),
        None => Err(ApiError::bad_request(format!(
            "Missing required parameter: {name}"
        ))),
    }
}

async fn convert(
    State(state): State<AppState>,
    Query(params): Query<ConvertParams>,
) -> Result<Json<ConversionResult>, ApiError> {
    let from = required_code(params.from.as_deref(), "from")?;
    let to = required_code(params.to.as_deref(), "to")?;
    let amount = match params.amount.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<f64>().map_err(|_| {
            ApiError::bad_request(format!("Invalid amount: '{raw}'"))
        })?),
    };

    let result = state
        .conversion
        .convert(&from, &to, amount)
        .await
        .map_err(|e| {
            warn!(error = %e, "Conversion request failed");
            ApiError::from(e)
        })?;
    Ok(Json(result))
}
