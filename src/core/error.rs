//! Error types shared by the conversion engine.

use crate::core::currency::CurrencyCode;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a remote rate provider.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    /// Network error or 5xx. Asking again later may succeed.
    #[error("{provider} unavailable{}: {message}", status_suffix(.status))]
    Transient {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    /// Unknown currency or other 4xx. Asking again will not help.
    #[error("{provider} rejected request{}: {message}", status_suffix(.status))]
    Permanent {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    #[error("{provider} did not answer within {after:?}")]
    Timeout { provider: String, after: Duration },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map_or_else(String::new, |s| format!(" (HTTP {s})"))
}

impl ProviderError {
    pub fn transient(provider: &str, status: Option<u16>, message: impl Into<String>) -> Self {
        ProviderError::Transient {
            provider: provider.to_string(),
            status,
            message: message.into(),
        }
    }

    pub fn permanent(provider: &str, status: Option<u16>, message: impl Into<String>) -> Self {
        ProviderError::Permanent {
            provider: provider.to_string(),
            status,
            message: message.into(),
        }
    }

    /// Maps an HTTP error status to the matching failure class.
    /// 429 and 5xx are transient, any other status is permanent.
    pub fn from_status(provider: &str, status: u16, message: impl Into<String>) -> Self {
        if status == 429 || status >= 500 {
            Self::transient(provider, Some(status), message)
        } else {
            Self::permanent(provider, Some(status), message)
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Transient { .. } | ProviderError::Timeout { .. }
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Transient { status, .. } | ProviderError::Permanent { status, .. } => {
                *status
            }
            ProviderError::Timeout { .. } => None,
        }
    }

    pub fn provider(&self) -> &str {
        match self {
            ProviderError::Transient { provider, .. }
            | ProviderError::Permanent { provider, .. }
            | ProviderError::Timeout { provider, .. } => provider,
        }
    }

    pub fn from_reqwest(provider: &str, e: reqwest::Error) -> Self {
        // Strip the query string, it may carry credentials for some providers.
        let msg = e.to_string();
        let sanitized = match msg.find('?') {
            Some(idx) => format!("{}?<query redacted>", &msg[..idx]),
            None => msg,
        };
        match e.status() {
            Some(status) => ProviderError::from_status(provider, status.as_u16(), sanitized),
            None => ProviderError::transient(provider, None, sanitized),
        }
    }
}

/// Failure of a single conversion request.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConversionError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Conversion from {from} to {to} failed: {source}")]
    ConversionFailed {
        from: CurrencyCode,
        to: CurrencyCode,
        #[source]
        source: ProviderError,
    },
}

/// Free text that matches none of the accepted amount formats.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Could not read an amount from '{input}'. Expected one of: {hint}")]
pub struct ParseError {
    pub input: String,
    pub hint: String,
}
