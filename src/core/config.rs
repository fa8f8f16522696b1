use crate::core::aggregation::Valuation;
use crate::core::currency::CurrencyCode;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// A single holding. Missing `currency` means the reporting currency.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Holding {
    pub name: String,
    pub cost_basis: Option<f64>,
    pub current_value: f64,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Portfolio {
    pub name: String,
    #[serde(default)]
    pub holdings: Vec<Holding>,
}

impl Portfolio {
    /// Turns holdings into valuations, tagging untagged ones with `default_currency`.
    pub fn valuations(&self, default_currency: &CurrencyCode) -> Result<Vec<Valuation>> {
        self.holdings
            .iter()
            .map(|h| {
                let currency = match &h.currency {
                    Some(c) => CurrencyCode::parse(c)
                        .with_context(|| format!("Invalid currency for holding '{}'", h.name))?,
                    None => default_currency.clone(),
                };
                Ok(Valuation::new(
                    h.cost_basis.unwrap_or(0.0),
                    h.current_value,
                    currency,
                ))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    #[default]
    Yahoo,
    Frankfurter,
    Endpoint,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FrankfurterProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EndpointProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub rates: RateSource,
    pub yahoo: Option<YahooProviderConfig>,
    pub frankfurter: Option<FrankfurterProviderConfig>,
    pub endpoint: Option<EndpointProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            rates: RateSource::Yahoo,
            yahoo: Some(YahooProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            }),
            frankfurter: Some(FrankfurterProviderConfig {
                base_url: "https://api.frankfurter.dev/v1".to_string(),
            }),
            endpoint: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_freshness_secs() -> u64 {
    300
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConversionConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_freshness_secs")]
    pub freshness_secs: u64,
}

impl ConversionConfig {
    /// Cache freshness window; errors when `freshness_secs` does not fit a `chrono::Duration`.
    pub fn freshness(&self) -> Result<chrono::Duration> {
        i64::try_from(self.freshness_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .with_context(|| {
                format!(
                    "conversion.freshness_secs is out of range: {}",
                    self.freshness_secs
                )
            })
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        ConversionConfig {
            timeout_secs: default_timeout_secs(),
            freshness_secs: default_freshness_secs(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub portfolios: Vec<Portfolio>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub currency: String,
    pub data_path: Option<String>,
    #[serde(default)]
    pub conversion: ConversionConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "fxval", "fxval")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "fxval", "fxval")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.reporting_currency()?;
        config.conversion.freshness().with_context(|| {
            format!("Invalid config file: {}", path.as_ref().display())
        })?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// The configured default reporting currency.
    pub fn reporting_currency(&self) -> Result<CurrencyCode> {
        CurrencyCode::parse(&self.currency)
            .with_context(|| format!("Invalid reporting currency in config: '{}'", self.currency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
portfolios:
  - name: "Brokerage"
    holdings:
      - name: "AAPL"
        cost_basis: 1500.0
        current_value: 1900.0
        currency: "USD"
      - name: "SAP"
        current_value: 800.0
        currency: "eur"
  - name: "Savings"
    holdings:
      - name: "Fixed deposit"
        cost_basis: 50000.0
        current_value: 53000.0
currency: "INR"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.portfolios.len(), 2);
        assert_eq!(config.portfolios[0].name, "Brokerage");
        assert_eq!(config.portfolios[0].holdings.len(), 2);
        assert_eq!(config.portfolios[0].holdings[1].cost_basis, None);
        assert_eq!(config.currency, "INR");

        // Defaults when sections are missing
        assert_eq!(config.providers.rates, RateSource::Yahoo);
        assert_eq!(
            config.providers.yahoo.unwrap().base_url,
            "https://query1.finance.yahoo.com"
        );
        assert_eq!(config.conversion.timeout_secs, 10);
        assert_eq!(config.conversion.freshness_secs, 300);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_provider_selection() {
        let yaml_str = r#"
providers:
  rates: frankfurter
  frankfurter:
    base_url: "http://example.com/frankfurter"
conversion:
  timeout_secs: 3
server:
  port: 8080
currency: "EUR"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert!(config.portfolios.is_empty());
        assert_eq!(config.providers.rates, RateSource::Frankfurter);
        assert_eq!(
            config.providers.frankfurter.unwrap().base_url,
            "http://example.com/frankfurter"
        );
        assert!(config.providers.yahoo.is_none());
        assert_eq!(config.conversion.timeout_secs, 3);
        assert_eq!(config.conversion.freshness_secs, 300);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_holdings_to_valuations() {
        let portfolio = Portfolio {
            name: "Mixed".to_string(),
            holdings: vec![
                Holding {
                    name: "Cash".to_string(),
                    cost_basis: None,
                    current_value: 100.0,
                    currency: None,
                },
                Holding {
                    name: "ETF".to_string(),
                    cost_basis: Some(90.0),
                    current_value: 95.0,
                    currency: Some("gbp".to_string()),
                },
            ],
        };
        let usd = CurrencyCode::parse("USD").unwrap();

        let valuations = portfolio.valuations(&usd).unwrap();
        assert_eq!(valuations[0], Valuation::new(0.0, 100.0, usd.clone()));
        assert_eq!(
            valuations[1],
            Valuation::new(90.0, 95.0, CurrencyCode::parse("GBP").unwrap())
        );
    }

    #[test]
    fn test_invalid_holding_currency() {
        let portfolio = Portfolio {
            name: "Broken".to_string(),
            holdings: vec![Holding {
                name: "Mystery".to_string(),
                cost_basis: None,
                current_value: 1.0,
                currency: Some("dollars".to_string()),
            }],
        };
        let err = portfolio
            .valuations(&CurrencyCode::parse("USD").unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("Mystery"));
    }

    #[test]
    fn test_invalid_reporting_currency_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "currency: \"rupees\"\n").unwrap();

        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert!(format!("{err:#}").contains("rupees"));
    }

    #[test]
    fn test_out_of_range_freshness_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "currency: \"USD\"\nconversion:\n  freshness_secs: 10000000000000000\n",
        )
        .unwrap();

        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert!(format!("{err:#}").contains("freshness_secs is out of range"));

        let wrapped = ConversionConfig {
            timeout_secs: 10,
            freshness_secs: u64::MAX,
        };
        assert!(wrapped.freshness().is_err());
    }

    #[test]
    fn test_freshness_window() {
        let config = ConversionConfig::default();
        assert_eq!(config.freshness().unwrap(), chrono::Duration::seconds(300));
    }
}
