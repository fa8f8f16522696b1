//! Currency codes and the remote rate lookup abstraction

use crate::core::error::{ConversionError, ProviderError};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;
use std::str::FromStr;

/// Three-letter ISO-style currency identifier, always stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn parse(code: &str) -> Result<Self, ConversionError> {
        let normalized = code.trim().to_uppercase();
        if normalized.len() == 3 && normalized.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(CurrencyCode(normalized))
        } else {
            Err(ConversionError::InvalidRequest(format!(
                "'{code}' is not a three-letter currency code"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CurrencyCode::parse(s)
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for CurrencyCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CurrencyCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        CurrencyCode::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A remote source of exchange rates.
///
/// One call is one round trip; implementations never retry. A returned rate
/// is always finite and positive.
#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    /// Name used in logs and error payloads.
    fn name(&self) -> &str;

    async fn fetch_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<f64, ProviderError>;
}

/// Rejects rates that would violate the positive-rate invariant.
pub(crate) fn validate_rate(
    provider: &str,
    from: &CurrencyCode,
    to: &CurrencyCode,
    rate: f64,
) -> Result<f64, ProviderError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(ProviderError::permanent(
            provider,
            None,
            format!("Invalid rate {rate} for {from}/{to}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_normalized() {
        let code = CurrencyCode::parse(" usd ").unwrap();
        assert_eq!(code.as_str(), "USD");
        assert_eq!(code, "Usd".parse::<CurrencyCode>().unwrap());
    }

    #[test]
    fn test_invalid_codes_are_rejected() {
        for bad in ["", "US", "USDX", "U$D", "12A"] {
            assert!(
                matches!(
                    CurrencyCode::parse(bad),
                    Err(ConversionError::InvalidRequest(_))
                ),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_serde_uses_plain_string() {
        let code: CurrencyCode = serde_json::from_str("\"eur\"").unwrap();
        assert_eq!(code.as_str(), "EUR");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"EUR\"");
        assert!(serde_json::from_str::<CurrencyCode>("\"euro\"").is_err());
    }

    #[test]
    fn test_validate_rate() {
        let usd = CurrencyCode::parse("USD").unwrap();
        let eur = CurrencyCode::parse("EUR").unwrap();
        assert_eq!(validate_rate("test", &usd, &eur, 0.9), Ok(0.9));
        assert!(validate_rate("test", &usd, &eur, 0.0).is_err());
        assert!(validate_rate("test", &usd, &eur, -1.0).is_err());
        assert!(validate_rate("test", &usd, &eur, f64::NAN).is_err());
    }
}
